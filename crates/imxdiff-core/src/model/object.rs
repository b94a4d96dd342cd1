use crate::geometry::Geometry;
use crate::model::{DocumentIdentity, FieldMap, FieldValue, GeographicLocation};
use imxdiff_core_types::ContainerId;
use serde::{Deserialize, Serialize};

/// One identified object in a graph.
///
/// Relations to other nodes are identifier handles resolved through the
/// owning graph, never direct references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectNode {
    pub puic: String,
    pub tag: String,
    /// Tags of identified ancestors and this node, joined by the separator
    pub path: String,
    pub fields: FieldMap,
    /// Accepted extension records, in resolution order
    pub extensions: Vec<ObjectNode>,
    /// Identifier of the nearest identified ancestor
    pub parent: Option<String>,
    /// Every identified descendant at any depth, in document order
    pub descendants: Vec<String>,
    pub container_id: ContainerId,
    pub document: DocumentIdentity,
    /// Top-level phase section this node came from
    pub situation: Option<String>,
    pub location: Option<GeographicLocation>,
    pub geometry: Option<Geometry>,
}

impl ObjectNode {
    pub fn new(
        puic: impl Into<String>,
        tag: impl Into<String>,
        container_id: ContainerId,
        document: DocumentIdentity,
    ) -> Self {
        let tag = tag.into();
        Self {
            puic: puic.into(),
            path: tag.clone(),
            tag,
            fields: FieldMap::new(),
            extensions: Vec::new(),
            parent: None,
            descendants: Vec::new(),
            container_id,
            document,
            situation: None,
            location: None,
            geometry: None,
        }
    }

    /// Value of the `@name` attribute, empty when missing.
    pub fn name(&self) -> &str {
        self.fields.text("@name").unwrap_or_default()
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Fields merged in from extension records.
    pub fn extension_fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.extension_fields()
    }
}
