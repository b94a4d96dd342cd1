//! Timeline rendering of field sequences.
//!
//! A timeline is the first present value followed by one `"<alias>-> value"`
//! entry for every later slot whose value differs from the slot before it,
//! joined by `" | "`. Absence renders as `absent`.

use crate::diff::model::{FieldComparison, MultiDiff};
use crate::model::FieldValue;
use imxdiff_core_types::ContainerId;
use std::collections::BTreeMap;

pub const TIMELINE_SEPARATOR: &str = " | ";

/// Render one field's sequence. Empty when no slot holds a value.
pub fn render_timeline(
    comparison: &FieldComparison,
    aliases: &BTreeMap<ContainerId, String>,
) -> String {
    let mut parts = Vec::new();
    let mut previous: Option<&FieldValue> = None;
    for slot in &comparison.slots {
        match previous {
            None if slot.value.is_absent() => continue,
            None => parts.push(slot.value.to_string()),
            Some(before) if *before != slot.value => {
                let label = aliases
                    .get(&slot.container_id)
                    .map(String::as_str)
                    .unwrap_or_else(|| slot.container_id.as_str());
                parts.push(format!("{}-> {}", label, slot.value));
            }
            Some(_) => {}
        }
        previous = Some(&slot.value);
    }
    parts.join(TIMELINE_SEPARATOR)
}

/// Identifier -> field -> rendered timeline for a whole diff.
pub fn timeline(diff: &MultiDiff) -> BTreeMap<String, BTreeMap<String, String>> {
    diff.objects
        .iter()
        .map(|(puic, object)| {
            let fields = object
                .fields
                .iter()
                .map(|f| (f.field.clone(), render_timeline(f, &diff.aliases)))
                .collect();
            (puic.clone(), fields)
        })
        .collect()
}
