//! Diff computation.
//!
//! The entry point is [`compare`]. Per identifier it lines up one slot per
//! container, collects the union of field paths, classifies every field's
//! value sequence and aggregates per field, per object and per container.

use crate::config::DiffOptions;
use crate::diff::model::{
    ComparedObject, ContainerStatus, FieldComparison, FieldSlot, MultiDiff, TAGS_FIELD,
};
use crate::diff::status::{aggregate, classify, object_status};
use crate::model::value::EXTENSION_PREFIX;
use crate::model::{FieldValue, ObjectNode};
use crate::repo::MultiRepository;
use crate::{log_op_end, log_op_start};
use imxdiff_core_types::ContainerId;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

/// Compare every identifier of `multi` across its containers.
pub fn compare(multi: &MultiRepository, options: &DiffOptions) -> MultiDiff {
    let start = Instant::now();
    let container_order: Vec<ContainerId> =
        multi.container_order().into_iter().cloned().collect();
    log_op_start!("compare", container_count = container_order.len());

    let mut objects = BTreeMap::new();
    for puic in multi.keys() {
        let slots = multi.slots(puic);
        if let Some(compared) = compare_object(puic, &slots, &container_order, options) {
            objects.insert(puic.clone(), compared);
        }
    }

    let diff = MultiDiff {
        container_order,
        aliases: options.aliases.clone(),
        objects,
    };
    log_op_end!(
        "compare",
        duration_ms = start.elapsed().as_millis() as u64,
        object_count = diff.objects.len(),
        changed = diff.changed_objects().len()
    );
    diff
}

/// Compare one identifier. `None` when no container holds it.
pub fn compare_object(
    puic: &str,
    slots: &[Option<&ObjectNode>],
    container_order: &[ContainerId],
    options: &DiffOptions,
) -> Option<ComparedObject> {
    let tag = slots.iter().flatten().next()?.tag.clone();

    let mut fields: Vec<FieldComparison> = field_order(slots, options)
        .into_iter()
        .map(|name| {
            let values = slots
                .iter()
                .map(|slot| slot.and_then(|node| node.fields.get(&name)).cloned())
                .collect();
            field_comparison(name, values, container_order)
        })
        .collect();

    let tags = slots
        .iter()
        .map(|slot| slot.map(|node| FieldValue::text(node.path.as_str())))
        .collect();
    fields.push(field_comparison(TAGS_FIELD.to_string(), tags, container_order));

    let status = object_status(&fields.iter().map(|f| f.status).collect::<Vec<_>>());
    let container_status = container_order
        .iter()
        .enumerate()
        .map(|(index, container_id)| {
            let at_slot: Vec<_> = fields
                .iter()
                .filter_map(|f| f.slots.get(index))
                .map(|s| s.status)
                .collect();
            ContainerStatus {
                container_id: container_id.clone(),
                status: aggregate(&at_slot),
            }
        })
        .collect();

    Some(ComparedObject {
        puic: puic.to_string(),
        tag,
        fields,
        status,
        container_status,
    })
}

/// Union of field paths over all slots: priority fields first in their
/// configured order, the rest lexicographic.
fn field_order(slots: &[Option<&ObjectNode>], options: &DiffOptions) -> Vec<String> {
    let union: BTreeSet<&String> = slots
        .iter()
        .flatten()
        .flat_map(|node| node.fields.keys())
        .filter(|key| options.include_extensions || !key.starts_with(EXTENSION_PREFIX))
        .collect();

    let mut ordered: Vec<String> = options
        .priority_fields
        .iter()
        .filter(|p| union.contains(p))
        .cloned()
        .collect();
    ordered.extend(
        union
            .into_iter()
            .filter(|key| !options.priority_fields.contains(*key))
            .cloned(),
    );
    ordered
}

fn field_comparison(
    field: String,
    values: Vec<Option<FieldValue>>,
    container_order: &[ContainerId],
) -> FieldComparison {
    // an explicit Absent value is the same as a missing one
    let values: Vec<Option<FieldValue>> = values
        .into_iter()
        .map(|v| v.filter(|v| !v.is_absent()))
        .collect();
    let statuses = classify(&values);
    let slots = container_order
        .iter()
        .zip(values)
        .zip(statuses.iter().copied())
        .map(|((container_id, value), status)| FieldSlot {
            container_id: container_id.clone(),
            value: value.unwrap_or(FieldValue::Absent),
            status,
        })
        .collect();
    FieldComparison {
        field,
        slots,
        status: aggregate(&statuses),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::status::CompareStatus;
    use crate::model::DocumentIdentity;

    fn node(container: &str, fields: &[(&str, &str)]) -> ObjectNode {
        let mut n = ObjectNode::new(
            "s1",
            "Signal",
            ContainerId::from_string(container),
            DocumentIdentity::new("h", "5.0.0"),
        );
        n.path = "Signal".to_string();
        for (k, v) in fields {
            n.fields.insert(*k, *v);
        }
        n
    }

    fn order() -> Vec<ContainerId> {
        vec![ContainerId::from_string("a"), ContainerId::from_string("b")]
    }

    #[test]
    fn test_field_order_puts_priority_first() {
        let a = node("a", &[("@puic", "s1"), ("@name", "S"), ("@aspect", "x")]);
        let compared =
            compare_object("s1", &[Some(&a), None], &order(), &DiffOptions::default()).unwrap();
        let names: Vec<&str> = compared.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["@name", "@puic", "@aspect", TAGS_FIELD]);
    }

    #[test]
    fn test_container_status_per_slot() {
        let a = node("a", &[("@puic", "s1"), ("@name", "S")]);
        let b = node("b", &[("@puic", "s1"), ("@name", "T")]);
        let compared =
            compare_object("s1", &[Some(&a), Some(&b)], &order(), &DiffOptions::default())
                .unwrap();

        assert_eq!(compared.status, CompareStatus::Changed);
        assert_eq!(
            compared.status_of(&ContainerId::from_string("a")),
            Some(CompareStatus::NotChanged)
        );
        assert_eq!(
            compared.status_of(&ContainerId::from_string("b")),
            Some(CompareStatus::Changed)
        );
        assert_eq!(compared.changed_fields()[0].field, "@name");
    }

    #[test]
    fn test_extension_fields_can_be_excluded() {
        let a = node("a", &[("@puic", "s1"), ("extension_MicroNode.@x", "1")]);
        let b = node("b", &[("@puic", "s1"), ("extension_MicroNode.@x", "2")]);
        let slots = [Some(&a), Some(&b)];

        let with = compare_object("s1", &slots, &order(), &DiffOptions::default()).unwrap();
        assert_eq!(with.status, CompareStatus::Changed);

        let without = compare_object(
            "s1",
            &slots,
            &order(),
            &DiffOptions::default().without_extensions(),
        )
        .unwrap();
        assert_eq!(without.status, CompareStatus::NotChanged);
        assert!(without.field("extension_MicroNode.@x").is_none());
    }

    #[test]
    fn test_tags_field_tracks_path() {
        let a = node("a", &[("@puic", "s1")]);
        let mut b = node("b", &[("@puic", "s1")]);
        b.path = "Junction.Signal".to_string();
        let compared =
            compare_object("s1", &[Some(&a), Some(&b)], &order(), &DiffOptions::default())
                .unwrap();
        assert_eq!(
            compared.field(TAGS_FIELD).map(|f| f.status),
            Some(CompareStatus::Changed)
        );
    }
}
