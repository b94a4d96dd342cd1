//! Object graph builder.
//!
//! Walks a record tree in depth-first pre-order and turns every record that
//! carries the identifier attribute into an [`ObjectNode`]:
//!
//! 1. The structural parent is the nearest identified ancestor, skipping
//!    document-root tags. Pre-order guarantees it was built first; a missing
//!    parent is an integrity fault, not a data error.
//! 2. `path` is the parent's path plus the own tag.
//! 3. Fields come from the canonicalizer, which never crosses into
//!    identified descendants.
//! 4. Every identified ancestor records the new node as a descendant, so
//!    each node ends up with its full descendant set.
//! 5. Identifiers that now map to more than one node get a CRITICAL
//!    `DuplicateIdentifier` ledger entry. Building continues.

use crate::canonical::canonicalize;
use crate::config::CanonicalConfig;
use crate::errors::{ExErrorKind, ImxError, Result};
use crate::graph::ObjectGraph;
use crate::ledger::{Ledger, Severity};
use crate::model::{DocumentIdentity, GeographicLocation, ObjectNode, Record};
use crate::{log_op_end, log_op_error, log_op_start};
use imxdiff_core_types::ContainerId;
use std::collections::BTreeSet;
use std::time::Instant;

pub const DUPLICATE_MESSAGE: &str = "Duplicated puic in container";

/// One document (or one section of it) being ingested.
#[derive(Debug, Clone, Copy)]
pub struct DocumentScope<'a> {
    /// Subtree to walk; the document root or a situation section
    pub record: &'a Record,
    pub identity: &'a DocumentIdentity,
    pub container_id: &'a ContainerId,
}

impl<'a> DocumentScope<'a> {
    pub fn new(
        record: &'a Record,
        identity: &'a DocumentIdentity,
        container_id: &'a ContainerId,
    ) -> Self {
        Self {
            record,
            identity,
            container_id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub objects: usize,
    pub duplicates: usize,
}

/// Graph and ledger from [`build`], plus the integrity fault if one stopped
/// the walk early. On a fault the graph holds everything built before it.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub graph: ObjectGraph,
    pub ledger: Ledger,
    pub fault: Option<ImxError>,
}

impl BuildOutcome {
    /// # Errors
    ///
    /// The integrity fault, if any.
    pub fn into_result(self) -> Result<(ObjectGraph, Ledger)> {
        match self.fault {
            Some(err) => Err(err),
            None => Ok((self.graph, self.ledger)),
        }
    }
}

/// Build a fresh graph from one document scope.
pub fn build(scope: DocumentScope<'_>, config: &CanonicalConfig) -> BuildOutcome {
    let mut graph = ObjectGraph::new();
    let mut ledger = Ledger::new();
    let fault = add_document(&mut graph, &mut ledger, scope, config).err();
    BuildOutcome {
        graph,
        ledger,
        fault,
    }
}

/// Add the identified records of one document scope to an existing graph.
///
/// # Errors
///
/// `ImxError::IntegrityViolation` when a structural parent is missing from
/// the graph. Nodes built before the fault stay in `graph`.
pub fn add_document(
    graph: &mut ObjectGraph,
    ledger: &mut Ledger,
    scope: DocumentScope<'_>,
    config: &CanonicalConfig,
) -> Result<BuildStats> {
    let start = Instant::now();
    log_op_start!(
        "build",
        container_id = scope.container_id.as_str(),
        document_hash = scope.identity.content_hash.as_str()
    );

    let mut walk = Walk {
        graph: &mut *graph,
        config,
        scope,
        touched: BTreeSet::new(),
        built: 0,
    };
    let mut chain = Vec::new();
    if let Err(err) = walk.visit(scope.record, &mut chain) {
        log_op_error!(
            "build",
            err.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        return Err(err);
    }
    let Walk { touched, built, .. } = walk;

    let mut duplicates = 0;
    for puic in &touched {
        if graph.find_all(puic).len() > 1 {
            duplicates += 1;
            ledger.record(
                ExErrorKind::DuplicateIdentifier,
                Severity::Critical,
                puic.as_str(),
                DUPLICATE_MESSAGE,
                Some(scope.container_id),
            );
        }
    }

    log_op_end!(
        "build",
        duration_ms = start.elapsed().as_millis() as u64,
        object_count = built,
        duplicates = duplicates
    );
    Ok(BuildStats {
        objects: built,
        duplicates,
    })
}

/// One ancestor on the walk stack.
struct Frame<'r> {
    tag: &'r str,
    /// Identifier and index of the node built from this record
    node: Option<(String, usize)>,
    path: Option<String>,
}

struct Walk<'g, 's> {
    graph: &'g mut ObjectGraph,
    config: &'g CanonicalConfig,
    scope: DocumentScope<'s>,
    touched: BTreeSet<String>,
    built: usize,
}

impl<'g, 's> Walk<'g, 's> {
    fn visit<'r>(&mut self, record: &'r Record, chain: &mut Vec<Frame<'r>>) -> Result<()> {
        let frame = match record.attr(&self.config.identifier_attribute) {
            Some(puic) => self.build_node(record, puic, chain)?,
            None => Frame {
                tag: &record.tag,
                node: None,
                path: None,
            },
        };
        chain.push(frame);
        for child in &record.children {
            self.visit(child, chain)?;
        }
        chain.pop();
        Ok(())
    }

    fn build_node<'r>(
        &mut self,
        record: &'r Record,
        puic: &str,
        chain: &[Frame<'r>],
    ) -> Result<Frame<'r>> {
        let parent = chain
            .iter()
            .rev()
            .find(|f| f.node.is_some())
            .filter(|f| !self.config.is_root_tag(f.tag));

        let (parent_puic, path) = match parent {
            Some(Frame {
                node: Some((parent_puic, _)),
                path,
                ..
            }) => {
                if !self.graph.contains(parent_puic) {
                    return Err(ImxError::IntegrityViolation {
                        puic: puic.to_string(),
                        message: format!("parent {} was not built before its child", parent_puic),
                    });
                }
                let parent_path = path.as_deref().unwrap_or_default();
                (
                    Some(parent_puic.clone()),
                    format!("{}{}{}", parent_path, self.config.separator, record.tag),
                )
            }
            _ => (None, record.tag.clone()),
        };

        let situation = chain
            .iter()
            .rev()
            .find(|f| self.config.is_situation_tag(f.tag))
            .map(|f| f.tag.to_string());

        let mut node = ObjectNode::new(
            puic,
            record.tag.as_str(),
            self.scope.container_id.clone(),
            self.scope.identity.clone(),
        );
        node.path = path.clone();
        node.parent = parent_puic;
        node.situation = situation;
        node.fields = canonicalize(record, self.config);
        node.location = GeographicLocation::find(record, &self.config.identifier_attribute);

        let index = self.graph.insert(node);
        self.built += 1;
        self.touched.insert(puic.to_string());

        // every identified ancestor gains this node as a descendant
        for (ancestor, ancestor_index) in chain.iter().filter_map(|f| f.node.as_ref()) {
            if ancestor == puic {
                continue;
            }
            if let Some(target) = self
                .graph
                .get_mut(ancestor)
                .and_then(|list| list.get_mut(*ancestor_index))
            {
                if !target.descendants.iter().any(|d| d == puic) {
                    target.descendants.push(puic.to_string());
                }
            }
        }

        Ok(Frame {
            tag: &record.tag,
            node: Some((puic.to_string(), index)),
            path: Some(path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> DocumentIdentity {
        DocumentIdentity::new("hash-a", "5.0.0")
    }

    fn document() -> Record {
        Record::new("Project")
            .with_attr("puic", "project")
            .with_child(
                Record::new("Situation").with_child(
                    Record::new("Junction")
                        .with_attr("puic", "j1")
                        .with_attr("name", "J1")
                        .with_child(
                            Record::new("Switch")
                                .with_attr("puic", "sw1")
                                .with_child(Record::new("Blade").with_attr("puic", "b1")),
                        ),
                ),
            )
    }

    #[test]
    fn test_parent_path_and_situation() {
        let container = ContainerId::from_string("c1");
        let identity = identity();
        let root = document();
        let (graph, ledger) = build(
            DocumentScope::new(&root, &identity, &container),
            &CanonicalConfig::default(),
        )
        .into_result()
        .unwrap();

        assert!(ledger.is_empty());
        let project = graph.first("project").unwrap();
        assert!(project.parent.is_none());

        let junction = graph.first("j1").unwrap();
        assert_eq!(junction.parent, None);
        assert_eq!(junction.path, "Junction");
        assert_eq!(junction.situation.as_deref(), Some("Situation"));
        assert_eq!(junction.name(), "J1");

        let blade = graph.first("b1").unwrap();
        assert_eq!(blade.parent.as_deref(), Some("sw1"));
        assert_eq!(blade.path, "Junction.Switch.Blade");
        assert_eq!(blade.container_id, container);
    }

    #[test]
    fn test_descendants_are_the_full_set() {
        let container = ContainerId::from_string("c1");
        let identity = identity();
        let root = document();
        let outcome = build(
            DocumentScope::new(&root, &identity, &container),
            &CanonicalConfig::default(),
        );
        let graph = outcome.graph;

        assert_eq!(graph.first("j1").unwrap().descendants, vec!["sw1", "b1"]);
        assert_eq!(graph.first("sw1").unwrap().descendants, vec!["b1"]);
        assert_eq!(
            graph.first("project").unwrap().descendants,
            vec!["j1", "sw1", "b1"]
        );
    }

    #[test]
    fn test_duplicates_are_flagged_and_kept() {
        let container = ContainerId::from_string("c1");
        let identity = identity();
        let root = Record::new("Situation")
            .with_child(Record::new("Signal").with_attr("puic", "s1"))
            .with_child(Record::new("Signal").with_attr("puic", "s1"));
        let outcome = build(
            DocumentScope::new(&root, &identity, &container),
            &CanonicalConfig::default(),
        );

        assert!(outcome.fault.is_none());
        assert_eq!(outcome.graph.find_all("s1").len(), 2);
        let entries = outcome.ledger.for_puic("s1");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Critical);
        assert_eq!(entries[0].kind, ExErrorKind::DuplicateIdentifier);
        assert_eq!(entries[0].message, DUPLICATE_MESSAGE);
    }
}
