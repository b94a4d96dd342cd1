//! Identifier-keyed object graph.
//!
//! Each identifier maps to a list of nodes. In an [`ObjectGraph`] (one
//! ingestion) the list holds exactly one node unless the identifier is
//! duplicated. In a [`MergedGraph`] it holds one node per container that has
//! the identifier, in container order, and sharing is not a fault.

use crate::errors::{ImxError, Result};
use crate::model::ObjectNode;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectGraph {
    nodes: BTreeMap<String, Vec<ObjectNode>>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node under its identifier. Returns its index in that
    /// identifier's list.
    pub fn insert(&mut self, node: ObjectNode) -> usize {
        let list = self.nodes.entry(node.puic.clone()).or_default();
        list.push(node);
        list.len() - 1
    }

    pub fn contains(&self, puic: &str) -> bool {
        self.nodes.contains_key(puic)
    }

    /// All nodes for an identifier; empty when unknown.
    pub fn find_all(&self, puic: &str) -> &[ObjectNode] {
        self.nodes.get(puic).map(Vec::as_slice).unwrap_or_default()
    }

    /// First node for an identifier, ignoring duplicates.
    pub fn first(&self, puic: &str) -> Option<&ObjectNode> {
        self.find_all(puic).first()
    }

    /// The single node for an identifier.
    ///
    /// # Errors
    ///
    /// `ImxError::AmbiguousLookup` when more than one node shares the
    /// identifier.
    pub fn find(&self, puic: &str) -> Result<Option<&ObjectNode>> {
        match self.find_all(puic) {
            [] => Ok(None),
            [single] => Ok(Some(single)),
            many => Err(ImxError::AmbiguousLookup {
                puic: puic.to_string(),
                count: many.len(),
            }),
        }
    }

    pub(crate) fn get_mut(&mut self, puic: &str) -> Option<&mut Vec<ObjectNode>> {
        self.nodes.get_mut(puic)
    }

    /// Remove every node of an identifier.
    pub fn remove(&mut self, puic: &str) -> Vec<ObjectNode> {
        self.nodes.remove(puic).unwrap_or_default()
    }

    /// Keep only the nodes matching `keep`, dropping identifiers left empty.
    pub fn retain_nodes<F>(&mut self, mut keep: F)
    where
        F: FnMut(&ObjectNode) -> bool,
    {
        for list in self.nodes.values_mut() {
            list.retain(|n| keep(n));
        }
        self.nodes.retain(|_, list| !list.is_empty());
    }

    /// Identifiers in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.nodes.keys()
    }

    /// Number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node, duplicates included.
    pub fn nodes(&self) -> impl Iterator<Item = &ObjectNode> {
        self.nodes.values().flatten()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }

    /// Identifier lists as stored.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Vec<ObjectNode>)> {
        self.nodes.iter()
    }

    /// Identifiers mapping to more than one node.
    pub fn duplicates(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|(_, list)| list.len() > 1)
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Every object, one per identifier.
    ///
    /// # Errors
    ///
    /// `ImxError::DuplicateIdentifiers` while any identifier is duplicated.
    pub fn objects(&self) -> Result<Vec<&ObjectNode>> {
        let duplicates = self.duplicates();
        if !duplicates.is_empty() {
            return Err(ImxError::DuplicateIdentifiers {
                puics: duplicates.into_iter().map(str::to_string).collect(),
            });
        }
        Ok(self.nodes().collect())
    }

    pub fn get_by_types(&self, types: &[&str]) -> Vec<&ObjectNode> {
        self.nodes()
            .filter(|n| types.contains(&n.tag.as_str()))
            .collect()
    }

    pub fn all_types(&self) -> BTreeSet<&str> {
        self.nodes().map(|n| n.tag.as_str()).collect()
    }

    pub fn get_by_paths(&self, paths: &[&str]) -> Vec<&ObjectNode> {
        self.nodes()
            .filter(|n| paths.contains(&n.path.as_str()))
            .collect()
    }

    pub fn all_paths(&self) -> BTreeSet<&str> {
        self.nodes().map(|n| n.path.as_str()).collect()
    }

    pub fn parent_of(&self, node: &ObjectNode) -> Option<&ObjectNode> {
        node.parent.as_deref().and_then(|p| self.first(p))
    }

    /// Nodes whose structural parent is `puic`.
    pub fn children_of(&self, puic: &str) -> Vec<&ObjectNode> {
        self.nodes()
            .filter(|n| n.parent.as_deref() == Some(puic))
            .collect()
    }

    /// Every identified descendant of the first node for `puic`.
    pub fn descendants_of(&self, puic: &str) -> Vec<&ObjectNode> {
        self.first(puic)
            .map(|node| {
                node.descendants
                    .iter()
                    .flat_map(|d| self.find_all(d))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Multi-container view: identifier -> one node per container, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergedGraph {
    inner: ObjectGraph,
}

impl MergedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, node: ObjectNode) {
        self.inner.insert(node);
    }

    pub(crate) fn retain_nodes<F>(&mut self, keep: F)
    where
        F: FnMut(&ObjectNode) -> bool,
    {
        self.inner.retain_nodes(keep)
    }

    pub fn contains(&self, puic: &str) -> bool {
        self.inner.contains(puic)
    }

    /// Nodes for an identifier across containers; empty when unknown.
    pub fn find(&self, puic: &str) -> &[ObjectNode] {
        self.inner.find_all(puic)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.inner.keys()
    }

    /// Number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ObjectNode> {
        self.inner.nodes()
    }

    /// Every identifier with its per-container nodes.
    pub fn objects(&self) -> impl Iterator<Item = (&str, &[ObjectNode])> {
        self.inner
            .entries()
            .map(|(puic, list)| (puic.as_str(), list.as_slice()))
    }

    pub fn get_by_types(&self, types: &[&str]) -> Vec<&ObjectNode> {
        self.inner.get_by_types(types)
    }

    pub fn all_types(&self) -> BTreeSet<&str> {
        self.inner.all_types()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentIdentity;
    use imxdiff_core_types::ContainerId;

    fn node(puic: &str, tag: &str) -> ObjectNode {
        ObjectNode::new(
            puic,
            tag,
            ContainerId::from_string("c"),
            DocumentIdentity::new("h", "12.0.0"),
        )
    }

    #[test]
    fn test_find_and_duplicates() {
        let mut graph = ObjectGraph::new();
        graph.insert(node("a", "Signal"));
        graph.insert(node("b", "Track"));
        assert!(graph.find("a").unwrap().is_some());
        assert!(graph.find("zz").unwrap().is_none());
        assert_eq!(graph.objects().unwrap().len(), 2);

        assert_eq!(graph.insert(node("a", "Signal")), 1);
        assert_eq!(graph.duplicates(), vec!["a"]);
        assert!(matches!(
            graph.find("a"),
            Err(ImxError::AmbiguousLookup { count: 2, .. })
        ));
        assert!(matches!(
            graph.objects(),
            Err(ImxError::DuplicateIdentifiers { .. })
        ));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_type_and_path_queries() {
        let mut graph = ObjectGraph::new();
        let mut switch = node("sw", "Switch");
        switch.path = "Junction.Switch".to_string();
        switch.parent = Some("j".to_string());
        let mut junction = node("j", "Junction");
        junction.descendants = vec!["sw".to_string()];
        graph.insert(junction);
        graph.insert(switch);

        assert_eq!(graph.get_by_types(&["Switch"]).len(), 1);
        assert!(graph.all_types().contains("Junction"));
        assert_eq!(graph.get_by_paths(&["Junction.Switch"])[0].puic, "sw");
        let sw = graph.first("sw").unwrap();
        assert_eq!(graph.parent_of(sw).map(|n| n.puic.as_str()), Some("j"));
        assert_eq!(graph.children_of("j").len(), 1);
        assert_eq!(graph.descendants_of("j")[0].puic, "sw");
    }

    #[test]
    fn test_merged_graph_keeps_shared_identifiers() {
        let mut merged = MergedGraph::new();
        let mut other = node("a", "Signal");
        other.container_id = ContainerId::from_string("d");
        merged.insert(node("a", "Signal"));
        merged.insert(other);

        assert_eq!(merged.find("a").len(), 2);
        assert_eq!(merged.len(), 1);
        let (puic, nodes) = merged.objects().next().unwrap();
        assert_eq!(puic, "a");
        assert_eq!(nodes[1].container_id.as_str(), "d");
    }

    #[test]
    fn test_retain_nodes_drops_empty_keys() {
        let mut graph = ObjectGraph::new();
        graph.insert(node("a", "Signal"));
        graph.insert(node("b", "Signal"));
        graph.retain_nodes(|n| n.puic != "a");
        assert!(!graph.contains("a"));
        assert_eq!(graph.len(), 1);
    }
}
