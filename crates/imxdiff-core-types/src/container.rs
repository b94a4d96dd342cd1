//! Container identity
//!
//! Every ingested dataset (one export, possibly several documents) gets an
//! opaque id. Diff output refers to versions only through this id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, stable identifier of one ingested container
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    /// Generate a new random ContainerId using UUIDv4
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (fixtures, deserialization)
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl Default for ContainerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_id_generation() {
        let id1 = ContainerId::new();
        let id2 = ContainerId::new();

        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_container_id_display() {
        let id = ContainerId::from_string("container-1");
        assert_eq!(format!("{}", id), "container-1");
    }

    #[test]
    fn test_serialization_is_transparent() {
        let id = ContainerId::from_string("container-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"container-1\"");
        let deserialized: ContainerId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
