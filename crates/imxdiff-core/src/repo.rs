//! Repositories and multi-repositories.
//!
//! A [`Repository`] owns the graph and ledger of one container. A
//! [`MultiRepository`] holds an ordered list of repositories (the comparison
//! axis) and keeps a merged graph where each identifier maps to its nodes
//! from every repository that has it, in repository order.

use crate::builder::{add_document, BuildStats, DocumentScope};
use crate::config::CanonicalConfig;
use crate::connectivity::{assemble_rail_connections, ConnectivityStats};
use crate::errors::{ImxError, Result};
use crate::extension::{extend, ExtendStats, ReferenceConfig};
use crate::geometry::GeometryProvider;
use crate::graph::{MergedGraph, ObjectGraph};
use crate::ledger::{DiagnosticSink, Ledger};
use crate::model::{DocumentIdentity, ObjectNode, Record};
use crate::{log_op_end, log_op_start};
use imxdiff_core_types::ContainerId;
use std::collections::BTreeSet;
use std::time::Instant;

/// Configuration handed to ingestion.
#[derive(Clone, Copy)]
pub struct IngestContext<'a> {
    pub canonical: &'a CanonicalConfig,
    pub references: &'a ReferenceConfig,
    /// Rail connection geometry is assembled only when a provider is given
    pub geometry: Option<&'a dyn GeometryProvider>,
}

impl<'a> IngestContext<'a> {
    pub fn new(canonical: &'a CanonicalConfig, references: &'a ReferenceConfig) -> Self {
        Self {
            canonical,
            references,
            geometry: None,
        }
    }

    pub fn with_geometry(mut self, geometry: &'a dyn GeometryProvider) -> Self {
        self.geometry = Some(geometry);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub build: BuildStats,
    pub extend: ExtendStats,
    pub connectivity: ConnectivityStats,
}

/// One container: its graph, ledger and the documents it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Repository {
    container_id: ContainerId,
    graph: ObjectGraph,
    ledger: Ledger,
    documents: Vec<DocumentIdentity>,
    situation: Option<String>,
}

impl Repository {
    pub fn new(container_id: ContainerId) -> Self {
        Self {
            container_id,
            graph: ObjectGraph::new(),
            ledger: Ledger::new(),
            documents: Vec::new(),
            situation: None,
        }
    }

    /// Ingest a set of documents as one container.
    ///
    /// All documents are built first, then every document's extensions are
    /// resolved, then rail connection geometry is assembled when the context
    /// carries a geometry provider.
    ///
    /// # Errors
    ///
    /// `ImxError::IntegrityViolation` from the builder.
    pub fn ingest(
        container_id: ContainerId,
        documents: &[(&Record, DocumentIdentity)],
        ctx: &IngestContext<'_>,
    ) -> Result<Self> {
        let mut repo = Self::new(container_id);
        for (record, identity) in documents {
            repo.add_document(record, identity.clone(), ctx)?;
        }
        for (record, identity) in documents {
            repo.extend_document(record, identity, ctx);
        }
        if let Some(geometry) = ctx.geometry {
            repo.assemble_connectivity(geometry);
        }
        Ok(repo)
    }

    /// Build the identified records of one document into this repository.
    ///
    /// # Errors
    ///
    /// `ImxError::IntegrityViolation` from the builder.
    pub fn add_document(
        &mut self,
        record: &Record,
        identity: DocumentIdentity,
        ctx: &IngestContext<'_>,
    ) -> Result<BuildStats> {
        let scope = DocumentScope::new(record, &identity, &self.container_id);
        let stats = add_document(&mut self.graph, &mut self.ledger, scope, ctx.canonical)?;
        self.documents.push(identity);
        Ok(stats)
    }

    /// Resolve extension records of one document against this repository.
    pub fn extend_document(
        &mut self,
        record: &Record,
        identity: &DocumentIdentity,
        ctx: &IngestContext<'_>,
    ) -> ExtendStats {
        let scope = DocumentScope::new(record, identity, &self.container_id);
        extend(
            &mut self.graph,
            &mut self.ledger,
            ctx.references,
            scope,
            ctx.canonical,
        )
    }

    pub fn assemble_connectivity(&mut self, geometry: &dyn GeometryProvider) -> ConnectivityStats {
        assemble_rail_connections(
            &mut self.graph,
            &mut self.ledger,
            geometry,
            &self.container_id,
        )
    }

    pub fn container_id(&self) -> &ContainerId {
        &self.container_id
    }

    pub fn graph(&self) -> &ObjectGraph {
        &self.graph
    }

    /// Direct access for callers that patch a graph after ingestion.
    pub fn graph_mut(&mut self) -> &mut ObjectGraph {
        &mut self.graph
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn documents(&self) -> &[DocumentIdentity] {
        &self.documents
    }

    /// Schema version of the first document.
    pub fn schema_version(&self) -> Option<&str> {
        self.documents.first().map(|d| d.schema_version.as_str())
    }

    pub fn situation(&self) -> Option<&str> {
        self.situation.as_deref()
    }

    pub fn with_situation(mut self, situation: impl Into<String>) -> Self {
        self.situation = Some(situation.into());
        self
    }

    /// # Errors
    ///
    /// `ImxError::AmbiguousLookup` for a duplicated identifier.
    pub fn find(&self, puic: &str) -> Result<Option<&ObjectNode>> {
        self.graph.find(puic)
    }

    pub fn find_all(&self, puic: &str) -> &[ObjectNode] {
        self.graph.find_all(puic)
    }

    /// # Errors
    ///
    /// `ImxError::DuplicateIdentifiers` while duplicates remain.
    pub fn objects(&self) -> Result<Vec<&ObjectNode>> {
        self.graph.objects()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.graph.keys()
    }

    pub fn get_by_types(&self, types: &[&str]) -> Vec<&ObjectNode> {
        self.graph.get_by_types(types)
    }

    pub fn get_by_paths(&self, paths: &[&str]) -> Vec<&ObjectNode> {
        self.graph.get_by_paths(paths)
    }

    /// Dispatch the ledger to `sink`.
    ///
    /// # Errors
    ///
    /// `ImxError::CriticalDiagnostic` on the first CRITICAL entry.
    pub fn drain_ledger(&self, sink: &mut dyn DiagnosticSink) -> Result<usize> {
        self.ledger.drain(sink)
    }
}

/// Ordered repositories merged by identifier.
#[derive(Debug, Clone, Default)]
pub struct MultiRepository {
    repositories: Vec<Repository>,
    graph: MergedGraph,
    ledger: Ledger,
}

impl MultiRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge clones of `repositories`, in the given order.
    ///
    /// With `version_safe` every repository must share one schema version.
    ///
    /// # Errors
    ///
    /// `ImxError::VersionMismatch` or `ImxError::DuplicateContainer`.
    pub fn from_repositories(repositories: &[&Repository], version_safe: bool) -> Result<Self> {
        Self::from_owned(
            repositories.iter().map(|r| (*r).clone()).collect(),
            version_safe,
        )
    }

    /// Merge repositories by taking ownership; no clone is made.
    ///
    /// # Errors
    ///
    /// `ImxError::VersionMismatch` or `ImxError::DuplicateContainer`.
    pub fn from_owned(repositories: Vec<Repository>, version_safe: bool) -> Result<Self> {
        let start = Instant::now();
        log_op_start!("merge", container_count = repositories.len());
        if version_safe {
            check_versions(repositories.iter())?;
        }
        let mut multi = Self::new();
        for repo in repositories {
            multi.push(repo)?;
        }
        log_op_end!(
            "merge",
            duration_ms = start.elapsed().as_millis() as u64,
            object_count = multi.graph.len()
        );
        Ok(multi)
    }

    /// Append a clone of `repository` as the last container.
    ///
    /// # Errors
    ///
    /// `ImxError::VersionMismatch` or `ImxError::DuplicateContainer`.
    pub fn add_container(&mut self, repository: &Repository, version_safe: bool) -> Result<()> {
        if version_safe {
            check_versions(self.repositories.iter().chain(std::iter::once(repository)))?;
        }
        self.push(repository.clone())
    }

    /// Remove a container and its nodes and ledger entries.
    ///
    /// # Errors
    ///
    /// `ImxError::UnknownContainer` when the id is not present.
    pub fn remove_container(&mut self, container_id: &ContainerId) -> Result<Repository> {
        let position = self
            .repositories
            .iter()
            .position(|r| r.container_id() == container_id)
            .ok_or_else(|| ImxError::UnknownContainer {
                container_id: container_id.clone(),
            })?;
        let removed = self.repositories.remove(position);
        self.graph.retain_nodes(|n| &n.container_id != container_id);
        self.ledger.remove_container(container_id);
        Ok(removed)
    }

    fn push(&mut self, repository: Repository) -> Result<()> {
        if self
            .repositories
            .iter()
            .any(|r| r.container_id() == repository.container_id())
        {
            return Err(ImxError::DuplicateContainer {
                container_id: repository.container_id().clone(),
            });
        }
        for node in repository.graph().nodes() {
            self.graph.insert(node.clone());
        }
        self.ledger.absorb(repository.ledger());
        self.repositories.push(repository);
        Ok(())
    }

    pub fn container_order(&self) -> Vec<&ContainerId> {
        self.repositories.iter().map(Repository::container_id).collect()
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn graph(&self) -> &MergedGraph {
        &self.graph
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Nodes for an identifier across containers, in container order.
    pub fn find(&self, puic: &str) -> &[ObjectNode] {
        self.graph.find(puic)
    }

    /// One slot per container in order: the node from that container, if any.
    pub fn slots(&self, puic: &str) -> Vec<Option<&ObjectNode>> {
        let nodes = self.graph.find(puic);
        self.repositories
            .iter()
            .map(|r| nodes.iter().find(|n| &n.container_id == r.container_id()))
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.graph.keys()
    }

    pub fn get_by_types(&self, types: &[&str]) -> Vec<&ObjectNode> {
        self.graph.get_by_types(types)
    }
}

fn check_versions<'a>(repositories: impl Iterator<Item = &'a Repository>) -> Result<()> {
    let versions: BTreeSet<&str> = repositories.filter_map(Repository::schema_version).collect();
    if versions.len() > 1 {
        return Err(ImxError::VersionMismatch {
            versions: versions.into_iter().map(str::to_string).collect(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(id: &str, version: &str, puics: &[&str]) -> Repository {
        let mut root = Record::new("Situation");
        for p in puics {
            root = root.with_child(Record::new("Signal").with_attr("puic", *p));
        }
        let canonical = CanonicalConfig::default();
        let references = ReferenceConfig::builtin();
        let ctx = IngestContext::new(&canonical, &references);
        Repository::ingest(
            ContainerId::from_string(id),
            &[(&root, DocumentIdentity::new(format!("hash-{id}"), version))],
            &ctx,
        )
        .unwrap()
    }

    #[test]
    fn test_version_safe_merge() {
        let a = repo("a", "5.0.0", &["s1"]);
        let b = repo("b", "12.0.0", &["s1"]);
        assert!(matches!(
            MultiRepository::from_repositories(&[&a, &b], true),
            Err(ImxError::VersionMismatch { .. })
        ));
        assert!(MultiRepository::from_repositories(&[&a, &b], false).is_ok());
    }

    #[test]
    fn test_slots_follow_container_order() {
        let a = repo("a", "5.0.0", &["s1", "s2"]);
        let b = repo("b", "5.0.0", &["s2"]);
        let multi = MultiRepository::from_owned(vec![a, b], true).unwrap();

        let slots = multi.slots("s1");
        assert!(slots[0].is_some());
        assert!(slots[1].is_none());
        assert_eq!(multi.find("s2").len(), 2);
    }

    #[test]
    fn test_add_and_remove_container() {
        let a = repo("a", "5.0.0", &["s1"]);
        let b = repo("b", "5.0.0", &["s1", "s9"]);
        let mut multi = MultiRepository::from_repositories(&[&a], true).unwrap();
        multi.add_container(&b, true).unwrap();
        assert_eq!(multi.graph().len(), 2);
        assert!(matches!(
            multi.add_container(&b, true),
            Err(ImxError::DuplicateContainer { .. })
        ));

        let removed = multi.remove_container(b.container_id()).unwrap();
        assert_eq!(removed.container_id().as_str(), "b");
        assert!(!multi.graph().contains("s9"));
        assert_eq!(multi.find("s1").len(), 1);
        assert!(matches!(
            multi.remove_container(b.container_id()),
            Err(ImxError::UnknownContainer { .. })
        ));
    }
}
