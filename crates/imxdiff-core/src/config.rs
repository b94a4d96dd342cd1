//! Explicit, immutable configuration values.
//!
//! Nothing in the core reads configuration from global state. Callers build
//! these once and pass them by reference.

use imxdiff_core_types::ContainerId;
use std::collections::BTreeMap;

/// Rules for canonicalization and graph building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalConfig {
    /// Attribute that marks an element as an identified object
    pub identifier_attribute: String,
    /// Prefix for attribute keys in a field map
    pub attribute_prefix: String,
    /// Separator between field path segments
    pub separator: String,
    /// Document-root tags that never act as a structural parent
    pub root_tags: Vec<String>,
    /// Top-level phase sections
    pub situation_tags: Vec<String>,
    /// Repeated structured child tag -> attribute key used to order it
    pub natural_keys: BTreeMap<String, String>,
}

impl Default for CanonicalConfig {
    fn default() -> Self {
        Self {
            identifier_attribute: "puic".to_string(),
            attribute_prefix: "@".to_string(),
            separator: ".".to_string(),
            root_tags: vec!["Project".to_string()],
            situation_tags: vec![
                "Situation".to_string(),
                "InitialSituation".to_string(),
                "NewSituation".to_string(),
            ],
            natural_keys: BTreeMap::from([
                (
                    "RailConnectionInfo".to_string(),
                    "@railConnectionRef".to_string(),
                ),
                ("Announcement".to_string(), "@installationRef".to_string()),
            ]),
        }
    }
}

impl CanonicalConfig {
    /// Field key of the identifier attribute, e.g. `@puic`.
    pub fn identifier_key(&self) -> String {
        self.attribute_key(&self.identifier_attribute)
    }

    pub fn attribute_key(&self, attribute: &str) -> String {
        format!("{}{}", self.attribute_prefix, attribute)
    }

    pub fn is_root_tag(&self, tag: &str) -> bool {
        self.root_tags.iter().any(|t| t == tag)
    }

    pub fn is_situation_tag(&self, tag: &str) -> bool {
        self.situation_tags.iter().any(|t| t == tag)
    }
}

/// Options for the diff engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    /// Fields listed first, in this order, when present
    pub priority_fields: Vec<String>,
    /// Whether `extension_*` fields take part in the comparison
    pub include_extensions: bool,
    /// Display names per container, presentation only
    pub aliases: BTreeMap<ContainerId, String>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            priority_fields: vec!["@name".to_string(), "@puic".to_string()],
            include_extensions: true,
            aliases: BTreeMap::new(),
        }
    }
}

impl DiffOptions {
    pub fn with_alias(mut self, container_id: ContainerId, alias: impl Into<String>) -> Self {
        self.aliases.insert(container_id, alias.into());
        self
    }

    pub fn without_extensions(mut self) -> Self {
        self.include_extensions = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_canonical_config() {
        let config = CanonicalConfig::default();
        assert_eq!(config.identifier_key(), "@puic");
        assert!(config.is_root_tag("Project"));
        assert!(config.is_situation_tag("NewSituation"));
        assert!(!config.is_situation_tag("Signal"));
        assert_eq!(
            config.natural_keys.get("Announcement").map(String::as_str),
            Some("@installationRef")
        );
    }

    #[test]
    fn test_diff_options_alias() {
        let id = ContainerId::from_string("c-1");
        let options = DiffOptions::default().with_alias(id.clone(), "A");
        assert_eq!(options.aliases.get(&id).map(String::as_str), Some("A"));
        assert!(options.include_extensions);
        assert!(!options.without_extensions().include_extensions);
    }
}
