//! Exception ledger: non-fatal diagnostics collected during ingestion.
//!
//! Every builder stage records data-quality problems here instead of
//! failing. [`Ledger::drain`] is the single point where a CRITICAL entry
//! turns into an error.

use crate::errors::{ExErrorKind, ImxError, Result};
use imxdiff_core_types::ContainerId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub kind: ExErrorKind,
    pub severity: Severity,
    /// Identifier the entry is keyed by
    pub puic: String,
    pub message: String,
    pub container_id: Option<ContainerId>,
}

impl LedgerEntry {
    pub fn new(
        kind: ExErrorKind,
        severity: Severity,
        puic: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            puic: puic.into(),
            message: message.into(),
            container_id: None,
        }
    }

    pub fn with_container_id(mut self, container_id: ContainerId) -> Self {
        self.container_id = Some(container_id);
        self
    }
}

/// Receives ledger entries on drain.
pub trait DiagnosticSink {
    fn dispatch(&mut self, entry: &LedgerEntry);
}

/// Collects dispatched entries, mostly useful in tests.
impl DiagnosticSink for Vec<LedgerEntry> {
    fn dispatch(&mut self, entry: &LedgerEntry) {
        self.push(entry.clone());
    }
}

/// Emits each entry as a tracing event at a level matching its severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn dispatch(&mut self, entry: &LedgerEntry) {
        crate::log_diagnostic!("drain", entry);
    }
}

type DedupKey = (Option<ContainerId>, String, String);

fn dedup_key(entry: &LedgerEntry) -> DedupKey {
    (
        entry.container_id.clone(),
        entry.puic.clone(),
        entry.message.clone(),
    )
}

/// Ordered, de-duplicated diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "LedgerEntries", into = "LedgerEntries")]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
    seen: HashSet<DedupKey>,
}

/// Serialized form of a [`Ledger`]; the dedup set is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct LedgerEntries {
    entries: Vec<LedgerEntry>,
}

impl From<LedgerEntries> for Ledger {
    fn from(value: LedgerEntries) -> Self {
        let seen = value.entries.iter().map(dedup_key).collect();
        Self {
            entries: value.entries,
            seen,
        }
    }
}

impl From<Ledger> for LedgerEntries {
    fn from(value: Ledger) -> Self {
        Self {
            entries: value.entries,
        }
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry unless one with the same (puic, message) exists for
    /// the same container.
    ///
    /// Returns whether the entry was added.
    pub fn add(&mut self, entry: LedgerEntry) -> bool {
        if !self.seen.insert(dedup_key(&entry)) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Shorthand for [`Ledger::add`].
    pub fn record(
        &mut self,
        kind: ExErrorKind,
        severity: Severity,
        puic: impl Into<String>,
        message: impl Into<String>,
        container_id: Option<&ContainerId>,
    ) -> bool {
        let mut entry = LedgerEntry::new(kind, severity, puic, message);
        entry.container_id = container_id.cloned();
        self.add(entry)
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries keyed by one identifier, in insertion order.
    pub fn for_puic(&self, puic: &str) -> Vec<&LedgerEntry> {
        self.entries.iter().filter(|e| e.puic == puic).collect()
    }

    /// Identifier -> entries view.
    pub fn by_puic(&self) -> BTreeMap<&str, Vec<&LedgerEntry>> {
        let mut out: BTreeMap<&str, Vec<&LedgerEntry>> = BTreeMap::new();
        for entry in &self.entries {
            out.entry(entry.puic.as_str()).or_default().push(entry);
        }
        out
    }

    pub fn of_kind(&self, kind: ExErrorKind) -> Vec<&LedgerEntry> {
        self.entries.iter().filter(|e| e.kind == kind).collect()
    }

    pub fn has_critical(&self) -> bool {
        self.entries.iter().any(|e| e.severity == Severity::Critical)
    }

    /// Dispatch every entry to `sink` in insertion order.
    ///
    /// Stops at the first CRITICAL entry, after dispatching it, and returns
    /// it as an error. Entries stay in the ledger either way. Returns the
    /// number of entries dispatched.
    ///
    /// # Errors
    ///
    /// `ImxError::CriticalDiagnostic` for the first CRITICAL entry.
    pub fn drain(&self, sink: &mut dyn DiagnosticSink) -> Result<usize> {
        for (i, entry) in self.entries.iter().enumerate() {
            sink.dispatch(entry);
            if entry.severity == Severity::Critical {
                tracing::debug!(dispatched = i + 1, "ledger drain aborted");
                return Err(ImxError::CriticalDiagnostic {
                    puic: entry.puic.clone(),
                    message: entry.message.clone(),
                });
            }
        }
        Ok(self.entries.len())
    }

    /// Append all entries of `other`, keeping the de-duplication rule.
    pub fn absorb(&mut self, other: &Ledger) {
        for entry in &other.entries {
            self.add(entry.clone());
        }
    }

    /// Drop every entry recorded for one container.
    pub fn remove_container(&mut self, container_id: &ContainerId) {
        self.entries
            .retain(|e| e.container_id.as_ref() != Some(container_id));
        self.seen = self.entries.iter().map(dedup_key).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(puic: &str, msg: &str) -> LedgerEntry {
        LedgerEntry::new(ExErrorKind::UnconnectedExtension, Severity::Warning, puic, msg)
    }

    #[test]
    fn test_add_deduplicates_by_puic_and_message() {
        let mut ledger = Ledger::new();
        assert!(ledger.add(warning("p1", "m")));
        assert!(!ledger.add(warning("p1", "m")));
        assert!(ledger.add(warning("p1", "other")));
        assert!(ledger.add(warning("p2", "m")));
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.for_puic("p1").len(), 2);
    }

    #[test]
    fn test_same_message_in_other_container_is_kept() {
        let mut ledger = Ledger::new();
        let a = ContainerId::from_string("a");
        let b = ContainerId::from_string("b");
        assert!(ledger.add(warning("p1", "m").with_container_id(a)));
        assert!(ledger.add(warning("p1", "m").with_container_id(b)));
        assert_eq!(ledger.by_puic().get("p1").map(Vec::len), Some(2));
    }

    #[test]
    fn test_drain_stops_at_critical() {
        let mut ledger = Ledger::new();
        ledger.add(warning("p1", "first"));
        ledger.add(LedgerEntry::new(
            ExErrorKind::DuplicateIdentifier,
            Severity::Critical,
            "p2",
            "Duplicated puic in container",
        ));
        ledger.add(warning("p3", "never dispatched"));

        let mut sink: Vec<LedgerEntry> = Vec::new();
        let err = ledger.drain(&mut sink).unwrap_err();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].puic, "p2");
        assert!(matches!(err, ImxError::CriticalDiagnostic { ref puic, .. } if puic == "p2"));
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_drain_without_critical_dispatches_all() {
        let mut ledger = Ledger::new();
        ledger.add(warning("p1", "a"));
        ledger.add(warning("p2", "b"));
        let mut sink: Vec<LedgerEntry> = Vec::new();
        assert_eq!(ledger.drain(&mut sink).unwrap(), 2);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_remove_container_restores_dedup_state() {
        let a = ContainerId::from_string("a");
        let b = ContainerId::from_string("b");
        let mut ledger = Ledger::new();
        ledger.add(warning("p1", "m").with_container_id(a.clone()));
        ledger.add(warning("p2", "m").with_container_id(b));

        ledger.remove_container(&a);
        assert_eq!(ledger.len(), 1);
        assert!(ledger.add(warning("p1", "m").with_container_id(a)));
    }

    #[test]
    fn test_deserialized_ledger_keeps_dedup_state() {
        let a = ContainerId::from_string("a");
        let mut ledger = Ledger::new();
        ledger.add(warning("p1", "m").with_container_id(a.clone()));

        let json = serde_json::to_string(&ledger).unwrap();
        assert!(json.starts_with(r#"{"entries":["#));
        let mut restored: Ledger = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ledger);
        assert!(!restored.add(warning("p1", "m").with_container_id(a)));
        assert_eq!(restored.len(), 1);
    }
}
