#![allow(clippy::unwrap_used, clippy::expect_used)]

use imxdiff_core::{canonicalize, CanonicalConfig, Record};
use proptest::prelude::*;

/// Repeated structured children of one signal, in a reference order.
fn structured_children() -> Vec<Record> {
    vec![
        Record::new("Announcement")
            .with_attr("installationRef", "i-3")
            .with_attr("kind", "bell"),
        Record::new("Announcement")
            .with_attr("installationRef", "i-1")
            .with_attr("kind", "light"),
        Record::new("Announcement")
            .with_attr("installationRef", "i-2")
            .with_attr("kind", "bell"),
        Record::new("Aspect")
            .with_attr("colour", "red")
            .with_child(Record::new("Lamp").with_attr("kind", "led")),
        Record::new("Aspect")
            .with_attr("colour", "green")
            .with_child(Record::new("Lamp").with_attr("kind", "bulb")),
        Record::new("Aspect")
            .with_attr("colour", "red")
            .with_child(Record::new("Lamp").with_attr("kind", "bulb")),
        Record::new("Blade").with_attr("puic", "b-1"),
    ]
}

fn signal_with(children: impl IntoIterator<Item = Record>) -> Record {
    let mut record = Record::new("Signal")
        .with_attr("puic", "s1")
        .with_attr("name", "S1")
        .with_child(Record::new("Ref").with_text("x"))
        .with_child(Record::new("Ref").with_text("y"));
    for child in children {
        record = record.with_child(child);
    }
    record
}

proptest! {
    #[test]
    fn canonicalize_ignores_structured_child_order(
        order in Just((0..7).collect::<Vec<usize>>()).prop_shuffle()
    ) {
        let config = CanonicalConfig::default();
        let children = structured_children();
        let reference = canonicalize(&signal_with(children.clone()), &config);
        let shuffled = signal_with(order.iter().map(|i| children[*i].clone()));

        prop_assert_eq!(canonicalize(&shuffled, &config), reference);
    }
}

#[test]
fn test_natural_key_decides_index() {
    // S1: natural key attribute orders announcements
    let fields = canonicalize(
        &signal_with(structured_children()),
        &CanonicalConfig::default(),
    );
    assert_eq!(fields.text("Announcement.0.@installationRef"), Some("i-1"));
    assert_eq!(fields.text("Announcement.1.@installationRef"), Some("i-2"));
    assert_eq!(fields.text("Announcement.2.@installationRef"), Some("i-3"));
}

#[test]
fn test_identified_child_never_flattened() {
    let fields = canonicalize(
        &signal_with(structured_children()),
        &CanonicalConfig::default(),
    );
    assert!(fields.keys().all(|k| !k.starts_with("Blade")));
    assert_eq!(fields.text("Ref.0"), Some("x"));
    assert_eq!(fields.text("Ref.1"), Some("y"));
}

#[test]
fn test_same_scalars_split_by_nested_content() {
    // S2: two red aspects differ only below the first level
    let fields = canonicalize(
        &signal_with(structured_children()),
        &CanonicalConfig::default(),
    );
    let lamps: Vec<&str> = (0..3)
        .filter_map(|i| fields.text(&format!("Aspect.{i}.Lamp.@kind")))
        .collect();
    assert_eq!(lamps.len(), 3);
    assert!(lamps.contains(&"led"));
    assert_eq!(lamps.iter().filter(|k| **k == "bulb").count(), 2);
}
