//! Rail connection geometry assembly.
//!
//! A rail connection has no geometry of its own. Its line is stitched from
//! the locations of the passages and the track it references, then oriented
//! from its from-junction towards its to-junction (both known through the
//! merged `MicroLink` extension). All problems are recorded as ERROR ledger
//! entries and assembly continues with whatever could be resolved.

use crate::errors::ExErrorKind;
use crate::geometry::{Geometry, GeometryProvider};
use crate::graph::ObjectGraph;
use crate::ledger::{Ledger, Severity};
use crate::model::ObjectNode;
use crate::{log_op_end, log_op_start};
use imxdiff_core_types::ContainerId;
use std::time::Instant;

pub const RAIL_CONNECTION_TAG: &str = "RailConnection";
pub const FROM_NODE_FIELD: &str = "extension_MicroLink.FromMicroNode.@nodeRef";
pub const TO_NODE_FIELD: &str = "extension_MicroLink.ToMicroNode.@nodeRef";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectivityStats {
    pub rail_connections: usize,
    pub assembled: usize,
    pub reversed: usize,
}

struct Assembled {
    puic: String,
    index: usize,
    geometry: Geometry,
    reversed: bool,
}

/// Attach a line geometry to every rail connection in `graph`.
pub fn assemble_rail_connections(
    graph: &mut ObjectGraph,
    ledger: &mut Ledger,
    geometry: &dyn GeometryProvider,
    container_id: &ContainerId,
) -> ConnectivityStats {
    let start = Instant::now();
    log_op_start!("assemble_rail_connections", container_id = container_id.as_str());

    let mut stats = ConnectivityStats::default();
    let mut results = Vec::new();
    let view: &ObjectGraph = graph;
    for (puic, list) in view.entries() {
        for (index, node) in list.iter().enumerate() {
            if node.tag != RAIL_CONNECTION_TAG {
                continue;
            }
            stats.rail_connections += 1;
            let mut ctx = Assembly {
                graph: view,
                ledger: &mut *ledger,
                geometry,
                container_id,
            };
            if let Some((line, reversed)) = ctx.assemble(node) {
                results.push(Assembled {
                    puic: puic.clone(),
                    index,
                    geometry: line,
                    reversed,
                });
            }
        }
    }

    for item in results {
        if let Some(node) = graph
            .get_mut(&item.puic)
            .and_then(|list| list.get_mut(item.index))
        {
            node.geometry = Some(item.geometry);
            stats.assembled += 1;
            if item.reversed {
                stats.reversed += 1;
            }
        }
    }

    log_op_end!(
        "assemble_rail_connections",
        duration_ms = start.elapsed().as_millis() as u64,
        object_count = stats.rail_connections,
        assembled = stats.assembled
    );
    stats
}

/// Passage identifiers from `@passageRefs`, falling back to the
/// `PassageRefs` text child.
fn passage_refs(node: &ObjectNode) -> Vec<String> {
    let from_attr: Vec<String> = node
        .fields
        .text("@passageRefs")
        .map(|v| v.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();
    if !from_attr.is_empty() {
        return from_attr;
    }
    node.fields
        .text("PassageRefs")
        .or_else(|| node.fields.text("PassageRefs.0"))
        .map(|v| v.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

struct Assembly<'a> {
    graph: &'a ObjectGraph,
    ledger: &'a mut Ledger,
    geometry: &'a dyn GeometryProvider,
    container_id: &'a ContainerId,
}

impl<'a> Assembly<'a> {
    fn report(&mut self, kind: ExErrorKind, puic: &str, message: String) {
        self.ledger.record(
            kind,
            Severity::Error,
            puic,
            message,
            Some(self.container_id),
        );
    }

    fn location_of(&mut self, rail_connection: &str, target: &ObjectNode) -> Option<Geometry> {
        let found = target
            .location
            .as_ref()
            .and_then(|loc| self.geometry.from_location(loc));
        if found.is_none() {
            self.report(
                ExErrorKind::MissingLocation,
                rail_connection,
                format!(
                    "{} {} of rail_connection {} has no geographic location",
                    target.tag, target.puic, rail_connection
                ),
            );
        }
        found
    }

    fn assemble(&mut self, node: &ObjectNode) -> Option<(Geometry, bool)> {
        let graph = self.graph;
        let puic = node.puic.as_str();
        let mut parts = Vec::new();

        for passage in passage_refs(node) {
            match graph.first(&passage) {
                Some(target) => parts.extend(self.location_of(puic, target)),
                None => self.report(
                    ExErrorKind::DanglingReference,
                    puic,
                    format!("Passage {} of rail_connection {} not present", passage, puic),
                ),
            }
        }
        if let Some(track) = node.fields.text("@trackRef") {
            match graph.first(track) {
                Some(target) => parts.extend(self.location_of(puic, target)),
                None => self.report(
                    ExErrorKind::DanglingReference,
                    puic,
                    format!("Track {} of rail_connection {} not present", track, puic),
                ),
            }
        }
        if parts.is_empty() {
            return None;
        }

        let line = self.geometry.merge_lines(&parts)?;
        if !matches!(line, Geometry::LineString(_)) {
            self.report(
                ExErrorKind::GeometryMergeFailure,
                puic,
                format!(
                    "RailConnection {} merge geometries results does not result in a single LineString",
                    puic
                ),
            );
        }

        let from = self.junction(node, FROM_NODE_FIELD, "FromMicroNode");
        let to = self.junction(node, TO_NODE_FIELD, "ToMicroNode");
        let (Some(from), Some(to), Some(first)) = (from, to, line.first_coord()) else {
            return Some((line, false));
        };

        let first = Geometry::Point(first);
        let reversed = self.geometry.distance(&first, &to) < self.geometry.distance(&first, &from);
        if reversed {
            Some((self.geometry.reverse(&line), true))
        } else {
            Some((line, false))
        }
    }

    fn junction(&mut self, node: &ObjectNode, field: &str, label: &str) -> Option<Geometry> {
        let graph = self.graph;
        let target = node.fields.text(field).and_then(|r| graph.first(r));
        match target {
            Some(junction) => self.location_of(&node.puic, junction),
            None => {
                self.report(
                    ExErrorKind::DanglingReference,
                    &node.puic,
                    format!("RailConnection {} missing {}", node.puic, label),
                );
                None
            }
        }
    }
}
