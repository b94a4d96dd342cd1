//! Canonical flattening of a nested record into a [`FieldMap`].
//!
//! ## Rules
//!
//! - Attributes become `@name` keys, children with non-blank text become
//!   leaf keys (attributes on such a child are dropped).
//! - A child carrying the identifier attribute belongs to another object and
//!   is never flattened into this one.
//! - A repeated scalar child is indexed by source order: `Tag.0`, `Tag.1`.
//! - A repeated structured child is indexed by content: first by its natural
//!   key attribute when one is configured for the tag, then by a SHA-256 of
//!   its own scalar values, then by a SHA-256 of its full flattened content.
//!   A structured child left alone after filtering is not indexed at all.
//!
//! ## Guarantee
//!
//! Two records that differ only in the source order of repeated structured
//! children canonicalize to identical maps.

use crate::config::CanonicalConfig;
use crate::digest::hash_string;
use crate::model::{FieldMap, FieldValue, Record};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Flatten `record` (attributes and subtree) into a canonical field map.
pub fn canonicalize(record: &Record, config: &CanonicalConfig) -> FieldMap {
    let nested = to_nested(record, config);
    let mut out = FieldMap::new();
    Flattener::new(config).flatten(&nested, "", &mut out);
    out
}

/// Attribute/child dictionary view of a record. Repeated tags collapse into
/// an array in source order.
fn to_nested(record: &Record, config: &CanonicalConfig) -> Map<String, Value> {
    let mut map = Map::new();
    for (name, value) in &record.attributes {
        map.insert(config.attribute_key(name), Value::String(value.clone()));
    }
    for child in &record.children {
        let value = match child.non_blank_text() {
            Some(text) => Value::String(text.to_string()),
            None => Value::Object(to_nested(child, config)),
        };
        match map.get_mut(&child.tag) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(child.tag.clone(), value);
            }
        }
    }
    map
}

struct Flattener<'a> {
    config: &'a CanonicalConfig,
    identifier_key: String,
}

impl<'a> Flattener<'a> {
    fn new(config: &'a CanonicalConfig) -> Self {
        Self {
            config,
            identifier_key: config.identifier_key(),
        }
    }

    fn is_identified(&self, value: &Value) -> bool {
        value
            .as_object()
            .is_some_and(|m| m.contains_key(&self.identifier_key))
    }

    fn flatten(&self, map: &Map<String, Value>, prefix: &str, out: &mut FieldMap) {
        let sep = &self.config.separator;
        for (key, value) in map {
            match value {
                Value::Object(_) | Value::Array(_) => {}
                scalar => {
                    out.insert(format!("{prefix}{key}"), scalar_value(scalar));
                    continue;
                }
            }

            let items: Vec<&Value> = match value {
                Value::Array(items) => items.iter().collect(),
                single => vec![single],
            };
            let scalar_list = items.first().is_some_and(|v| !v.is_object());

            if scalar_list {
                // source order is meaningful here
                for (i, item) in items.iter().enumerate() {
                    let path = format!("{prefix}{key}{sep}{i}");
                    match item {
                        Value::Object(child) if !self.is_identified(item) => {
                            self.flatten(child, &format!("{path}{sep}"), out)
                        }
                        Value::Object(_) => {}
                        scalar => out.insert(path, scalar_value(scalar)),
                    }
                }
                continue;
            }

            let mut remaining: Vec<&Value> = items
                .into_iter()
                .filter(|v| !self.is_identified(v))
                .collect();
            if remaining.len() > 1 {
                remaining.sort_by_cached_key(|item| self.sort_key(key, item));
            }

            let indexed = remaining.len() > 1;
            for (i, item) in remaining.iter().enumerate() {
                let leaf = if indexed {
                    format!("{prefix}{key}{sep}{i}")
                } else {
                    format!("{prefix}{key}")
                };
                match item {
                    Value::Object(child) => self.flatten(child, &format!("{leaf}{sep}"), out),
                    scalar => out.insert(leaf, scalar_value(scalar)),
                }
            }
        }
    }

    /// Content-derived ordering key of one repeated structured child.
    fn sort_key(&self, tag: &str, item: &Value) -> (Option<String>, String, String) {
        let natural = self
            .config
            .natural_keys
            .get(tag)
            .and_then(|attr| item.as_object()?.get(attr))
            .and_then(Value::as_str)
            .map(str::to_string);

        match item {
            Value::Object(map) => {
                let mut full = FieldMap::new();
                self.flatten(map, "", &mut full);
                (natural, scalar_digest(map), field_map_digest(&full))
            }
            scalar => {
                let digest = hash_string(&scalar.to_string());
                (natural, digest.clone(), digest)
            }
        }
    }
}

fn scalar_value(value: &Value) -> FieldValue {
    match value {
        Value::String(s) => FieldValue::Text(s.clone()),
        Value::Bool(b) => FieldValue::Boolean(*b),
        Value::Number(n) => n.as_f64().map_or(FieldValue::Absent, FieldValue::Number),
        _ => FieldValue::Absent,
    }
}

/// SHA-256 over the sorted-key JSON of a child's non-nested values.
fn scalar_digest(map: &Map<String, Value>) -> String {
    let sorted: BTreeMap<&String, &Value> = map
        .iter()
        .filter(|(_, v)| match v {
            Value::Object(_) => false,
            Value::Array(items) => items.iter().all(|i| !i.is_object()),
            _ => true,
        })
        .collect();
    let mut canonical = Map::new();
    for (k, v) in sorted {
        canonical.insert(k.clone(), v.clone());
    }
    hash_string(&Value::Object(canonical).to_string())
}

fn field_map_digest(fields: &FieldMap) -> String {
    let mut canonical = Map::new();
    for (k, v) in fields.iter() {
        let json = match v {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Number(n) => Value::String(n.to_string()),
            FieldValue::Absent => Value::Null,
        };
        canonical.insert(k.clone(), json);
    }
    hash_string(&Value::Object(canonical).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CanonicalConfig {
        CanonicalConfig::default()
    }

    #[test]
    fn test_attributes_and_text_children() {
        let record = Record::new("Signal")
            .with_attr("puic", "s1")
            .with_attr("name", "S1")
            .with_child(Record::new("Note").with_attr("lang", "nl").with_text("hello"))
            .with_child(Record::new("Empty"));

        let fields = canonicalize(&record, &config());
        assert_eq!(fields.text("@puic"), Some("s1"));
        assert_eq!(fields.text("@name"), Some("S1"));
        assert_eq!(fields.text("Note"), Some("hello"));
        assert!(!fields.contains_key("Note.@lang"));
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn test_identified_children_are_skipped() {
        let record = Record::new("Junction")
            .with_attr("puic", "j1")
            .with_child(
                Record::new("Switch")
                    .with_attr("puic", "sw1")
                    .with_attr("name", "W1"),
            )
            .with_child(Record::new("Metadata").with_attr("source", "x"));

        let fields = canonicalize(&record, &config());
        assert!(fields.keys().all(|k| !k.starts_with("Switch")));
        assert_eq!(fields.text("Metadata.@source"), Some("x"));
    }

    #[test]
    fn test_scalar_lists_keep_source_order() {
        let record = Record::new("Track")
            .with_child(Record::new("Ref").with_text("b"))
            .with_child(Record::new("Ref").with_text("a"));

        let fields = canonicalize(&record, &config());
        assert_eq!(fields.text("Ref.0"), Some("b"));
        assert_eq!(fields.text("Ref.1"), Some("a"));
    }

    #[test]
    fn test_structured_lists_sort_by_natural_key() {
        let info = |rc: &str, dir: &str| {
            Record::new("RailConnectionInfo")
                .with_attr("railConnectionRef", rc)
                .with_attr("direction", dir)
        };
        let record = Record::new("Signal")
            .with_child(info("rc-b", "Up"))
            .with_child(info("rc-a", "Down"));

        let fields = canonicalize(&record, &config());
        assert_eq!(
            fields.text("RailConnectionInfo.0.@railConnectionRef"),
            Some("rc-a")
        );
        assert_eq!(fields.text("RailConnectionInfo.1.@direction"), Some("Up"));
    }

    #[test]
    fn test_single_structured_child_is_not_indexed() {
        let record = Record::new("Signal")
            .with_child(Record::new("Sub").with_attr("puic", "other"))
            .with_child(Record::new("Sub").with_attr("kind", "plain"));

        let fields = canonicalize(&record, &config());
        assert_eq!(fields.text("Sub.@kind"), Some("plain"));
        assert!(!fields.contains_key("Sub.0.@kind"));
    }

    #[test]
    fn test_structured_order_independent_of_source_order() {
        let child = |v: &str| {
            Record::new("Marker")
                .with_attr("value", v)
                .with_child(Record::new("Comment").with_text(format!("c{v}")))
        };
        let a = Record::new("Obj")
            .with_child(child("1"))
            .with_child(child("2"))
            .with_child(child("3"));
        let b = Record::new("Obj")
            .with_child(child("3"))
            .with_child(child("1"))
            .with_child(child("2"));

        assert_eq!(canonicalize(&a, &config()), canonicalize(&b, &config()));
    }

    #[test]
    fn test_missing_natural_key_sorts_first() {
        let record = Record::new("Signal")
            .with_child(Record::new("Announcement").with_attr("installationRef", "i-1"))
            .with_child(Record::new("Announcement").with_attr("note", "none"));

        let fields = canonicalize(&record, &config());
        assert_eq!(fields.text("Announcement.0.@note"), Some("none"));
        assert_eq!(
            fields.text("Announcement.1.@installationRef"),
            Some("i-1")
        );
    }
}
