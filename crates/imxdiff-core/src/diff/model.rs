//! Diff output types.
//!
//! Everything serializes; maps are `BTreeMap` for stable output.

use crate::diff::status::CompareStatus;
use crate::model::FieldValue;
use imxdiff_core_types::ContainerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the synthetic field holding each slot's node path.
pub const TAGS_FIELD: &str = "tags";

/// One container's value of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSlot {
    pub container_id: ContainerId,
    /// `FieldValue::Absent` when the container lacks the field or the object
    pub value: FieldValue,
    pub status: CompareStatus,
}

/// The comparison sequence of one field of one identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldComparison {
    pub field: String,
    pub slots: Vec<FieldSlot>,
    /// Aggregate over the slot statuses
    pub status: CompareStatus,
}

impl FieldComparison {
    pub fn values(&self) -> Vec<&FieldValue> {
        self.slots.iter().map(|s| &s.value).collect()
    }

    pub fn statuses(&self) -> Vec<CompareStatus> {
        self.slots.iter().map(|s| s.status).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStatus {
    pub container_id: ContainerId,
    pub status: CompareStatus,
}

/// One identifier compared across all containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedObject {
    pub puic: String,
    /// Tag of the first container holding the object
    pub tag: String,
    /// Priority fields first, then lexicographic, `tags` last
    pub fields: Vec<FieldComparison>,
    pub status: CompareStatus,
    /// Per-container aggregate, one entry per slot
    pub container_status: Vec<ContainerStatus>,
}

impl ComparedObject {
    pub fn field(&self, name: &str) -> Option<&FieldComparison> {
        self.fields.iter().find(|f| f.field == name)
    }

    pub fn changed_fields(&self) -> Vec<&FieldComparison> {
        self.fields
            .iter()
            .filter(|f| f.status == CompareStatus::Changed)
            .collect()
    }

    /// Aggregate status at one container, `None` for an unknown container.
    pub fn status_of(&self, container_id: &ContainerId) -> Option<CompareStatus> {
        self.container_status
            .iter()
            .find(|c| &c.container_id == container_id)
            .map(|c| c.status)
    }
}

/// Result of comparing a multi-repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiDiff {
    pub container_order: Vec<ContainerId>,
    pub aliases: BTreeMap<ContainerId, String>,
    pub objects: BTreeMap<String, ComparedObject>,
}

impl MultiDiff {
    pub fn object(&self, puic: &str) -> Option<&ComparedObject> {
        self.objects.get(puic)
    }

    pub fn changed_objects(&self) -> Vec<&ComparedObject> {
        self.objects
            .values()
            .filter(|o| o.status == CompareStatus::Changed)
            .collect()
    }

    /// Objects whose aggregate at `container_id` is CHANGED.
    pub fn changed_in(&self, container_id: &ContainerId) -> Vec<&ComparedObject> {
        self.objects
            .values()
            .filter(|o| o.status_of(container_id) == Some(CompareStatus::Changed))
            .collect()
    }

    /// Display name of a container: its alias, or its id.
    pub fn alias_of<'a>(&'a self, container_id: &'a ContainerId) -> &'a str {
        self.aliases
            .get(container_id)
            .map(String::as_str)
            .unwrap_or_else(|| container_id.as_str())
    }
}
