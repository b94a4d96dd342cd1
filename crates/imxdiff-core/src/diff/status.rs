//! Change status state machine.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompareStatus {
    /// Present in the first container
    InitialPresent,
    NotPresent,
    Created,
    Deleted,
    NotChanged,
    Changed,
}

impl CompareStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareStatus::InitialPresent => "INITIAL_PRESENT",
            CompareStatus::NotPresent => "NOT_PRESENT",
            CompareStatus::Created => "CREATED",
            CompareStatus::Deleted => "DELETED",
            CompareStatus::NotChanged => "NOT_CHANGED",
            CompareStatus::Changed => "CHANGED",
        }
    }

    /// Created, deleted and changed all count as a change.
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            CompareStatus::Created | CompareStatus::Deleted | CompareStatus::Changed
        )
    }
}

impl std::fmt::Display for CompareStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a value sequence slot by slot.
///
/// `previous` starts absent and is updated after every slot, whichever
/// branch was taken.
pub fn classify<T: PartialEq>(values: &[Option<T>]) -> Vec<CompareStatus> {
    let mut previous: Option<&T> = None;
    let mut statuses = Vec::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        let value = value.as_ref();
        let status = match (previous, value) {
            (_, Some(_)) if index == 0 => CompareStatus::InitialPresent,
            (None, None) => CompareStatus::NotPresent,
            (None, Some(_)) => CompareStatus::Created,
            (Some(_), None) => CompareStatus::Deleted,
            (Some(before), Some(now)) if before == now => CompareStatus::NotChanged,
            (Some(_), Some(_)) => CompareStatus::Changed,
        };
        statuses.push(status);
        previous = value;
    }
    statuses
}

/// Three-way aggregate of a status list.
///
/// NOT_PRESENT when every status is NOT_PRESENT, CHANGED when any status is a
/// change, NOT_CHANGED otherwise.
pub fn aggregate(statuses: &[CompareStatus]) -> CompareStatus {
    if statuses.iter().all(|s| *s == CompareStatus::NotPresent) {
        CompareStatus::NotPresent
    } else if statuses.iter().any(CompareStatus::is_change) {
        CompareStatus::Changed
    } else {
        CompareStatus::NotChanged
    }
}

/// Object status from its field aggregates. NOT_PRESENT fields never
/// escalate.
pub fn object_status(field_statuses: &[CompareStatus]) -> CompareStatus {
    if field_statuses.contains(&CompareStatus::Changed) {
        CompareStatus::Changed
    } else {
        CompareStatus::NotChanged
    }
}
