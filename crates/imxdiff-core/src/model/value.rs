//! Scalar field values and the flat field map of one object.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix of every field merged in from an extension record.
pub const EXTENSION_PREFIX: &str = "extension_";

/// A canonical scalar.
///
/// `Absent` and `Text(String::new())` are distinct values: the status
/// classification treats the first as "not there" and the second as present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Absent,
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Absent => write!(f, "absent"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// Canonical field path -> value.
///
/// Keys iterate in lexicographic order; [`FieldMap::prioritized_keys`] gives
/// the presentation order with priority fields first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, FieldValue>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// Text value of a field, if present and textual.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Keys with `priority` entries first (in the given order, when present),
    /// then everything else lexicographically.
    pub fn prioritized_keys<'a>(&'a self, priority: &'a [String]) -> Vec<&'a str> {
        let mut out: Vec<&str> = priority
            .iter()
            .filter(|p| self.0.contains_key(p.as_str()))
            .map(String::as_str)
            .collect();
        out.extend(
            self.0
                .keys()
                .map(String::as_str)
                .filter(|k| !priority.iter().any(|p| p == k)),
        );
        out
    }

    /// Merge `other` under `<namespace>.<key>`.
    ///
    /// Keys under the extension prefix take the latest value; native keys
    /// are never overwritten. Returns the number of keys written.
    pub fn merge_namespaced(&mut self, namespace: &str, other: &FieldMap) -> usize {
        let mut written = 0;
        for (key, value) in other.iter() {
            let key = format!("{}.{}", namespace, key);
            if !key.starts_with(EXTENSION_PREFIX) && self.0.contains_key(&key) {
                continue;
            }
            self.0.insert(key, value.clone());
            written += 1;
        }
        written
    }

    /// Fields that came from extension records.
    pub fn extension_fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter().filter(|(k, _)| k.starts_with(EXTENSION_PREFIX))
    }

    /// Fields native to the object itself.
    pub fn native_fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter().filter(|(k, _)| !k.starts_with(EXTENSION_PREFIX))
    }
}

impl FromIterator<(String, FieldValue)> for FieldMap {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_differs_from_empty_text() {
        assert_ne!(FieldValue::Absent, FieldValue::text(""));
        assert!(FieldValue::Absent.is_absent());
        assert!(!FieldValue::text("").is_absent());
    }

    #[test]
    fn test_prioritized_keys() {
        let mut map = FieldMap::new();
        map.insert("@puic", "p");
        map.insert("@length", "10");
        map.insert("@name", "n");
        map.insert("Location.x", "1");
        let priority = vec!["@name".to_string(), "@puic".to_string()];
        assert_eq!(
            map.prioritized_keys(&priority),
            vec!["@name", "@puic", "@length", "Location.x"]
        );
    }

    #[test]
    fn test_merge_namespaced_latest_extension_wins() {
        let mut map = FieldMap::new();
        map.insert("@name", "base");
        map.insert("extension_MicroNode.@junctionRef", "first");

        let mut ext = FieldMap::new();
        ext.insert("@junctionRef", "second");
        ext.insert("@name", "ext");

        let written = map.merge_namespaced("extension_MicroNode", &ext);
        assert_eq!(written, 2);
        assert_eq!(map.text("@name"), Some("base"));
        assert_eq!(map.text("extension_MicroNode.@junctionRef"), Some("second"));
        assert_eq!(map.text("extension_MicroNode.@name"), Some("ext"));
        assert_eq!(map.extension_fields().count(), 2);
        assert_eq!(map.native_fields().count(), 1);
    }

    #[test]
    fn test_merge_namespaced_keeps_native_keys() {
        let mut map = FieldMap::new();
        map.insert("Location.@x", "1");
        let mut ext = FieldMap::new();
        ext.insert("@x", "9");
        ext.insert("@y", "2");

        assert_eq!(map.merge_namespaced("Location", &ext), 1);
        assert_eq!(map.text("Location.@x"), Some("1"));
        assert_eq!(map.text("Location.@y"), Some("2"));
    }

    #[test]
    fn test_untagged_serialization() {
        let mut map = FieldMap::new();
        map.insert("a", "x");
        map.insert("b", FieldValue::Absent);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"a":"x","b":null}"#);
    }
}
