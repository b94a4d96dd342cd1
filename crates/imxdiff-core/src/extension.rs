//! Extension resolution.
//!
//! Some object types live in one document but describe an object defined in
//! another (or the same) document of the container. A per-schema-version
//! table names, for each such type, the attribute holding the base object's
//! identifier. Accepted extensions are appended to the base node and their
//! canonical fields merged in under `extension_<Tag>.`.

use crate::builder::DocumentScope;
use crate::canonical::canonicalize;
use crate::config::CanonicalConfig;
use crate::errors::ExErrorKind;
use crate::graph::ObjectGraph;
use crate::ledger::{Ledger, Severity};
use crate::model::value::EXTENSION_PREFIX;
use crate::model::{GeographicLocation, ObjectNode};
use crate::{log_op_end, log_op_start};
use std::collections::BTreeMap;
use std::time::Instant;

/// Object type -> ordered reference attribute keys (first = base reference).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    entries: Vec<(String, Vec<String>)>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, object_type: &str, references: &[&str]) -> Self {
        self.entries.push((
            object_type.to_string(),
            references.iter().map(|r| r.to_string()).collect(),
        ));
        self
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(t, refs)| (t.as_str(), refs.as_slice()))
    }

    pub fn references(&self, object_type: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(t, _)| t == object_type)
            .map(|(_, refs)| refs.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reference tables per schema version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceConfig {
    tables: BTreeMap<String, ReferenceTable>,
}

impl ReferenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables for every recognized interchange schema version.
    pub fn builtin() -> Self {
        let base = || {
            ReferenceTable::new()
                .with_type("MicroNode", &["@junctionRef"])
                .with_type("MicroLink", &["@implementationObjectRef"])
                .with_type("ConditionNotification", &["@objectRef"])
                .with_type("ErtmsLevelCrossing", &["@levelCrossingRef"])
                .with_type("ErtmsSignal", &["@signalRef"])
                .with_type("ErtmsBaliseGroup", &["@baliseGroupRef"])
        };

        Self::new()
            .with_version(
                "1.2.4",
                ReferenceTable::new()
                    .with_type("MicroNode", &["@junctionRef"])
                    .with_type("MicroLink", &["@railConnectionRef"])
                    .with_type(
                        "FlankProtectionConfiguration",
                        &["@switchMechanismRef", "@position"],
                    ),
            )
            .with_version(
                "5.0.0",
                base().with_type("ErtmsRoute", &["@signalingRouteRef"]),
            )
            .with_version(
                "10.0.0",
                base()
                    .with_type("ErtmsRoute", &["@functionalRouteRef"])
                    .with_type(
                        "FlankProtectionConfiguration",
                        &["@switchMechanismRef", "@switchPosition"],
                    ),
            )
            .with_version(
                "11.0.0",
                base().with_type("ErtmsRoute", &["@functionalRouteRef"]),
            )
            .with_version(
                "12.0.0",
                base()
                    .with_type("ErtmsRoute", &["@functionalRouteRef"])
                    .with_type("ObservedLocation", &["@objectRef"]),
            )
    }

    pub fn with_version(mut self, version: &str, table: ReferenceTable) -> Self {
        self.tables.insert(version.to_string(), table);
        self
    }

    /// Table for a schema version; `None` for unrecognized versions.
    pub fn table(&self, schema_version: &str) -> Option<&ReferenceTable> {
        self.tables.get(schema_version)
    }

    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtendStats {
    pub candidates: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Resolve every extension record inside `scope` against `graph`.
///
/// Unknown schema versions resolve nothing. Problems are recorded as
/// `UnconnectedExtension` warnings; the base node is left untouched.
pub fn extend(
    graph: &mut ObjectGraph,
    ledger: &mut Ledger,
    references: &ReferenceConfig,
    scope: DocumentScope<'_>,
    config: &CanonicalConfig,
) -> ExtendStats {
    let start = Instant::now();
    let version = scope.identity.schema_version.as_str();
    let Some(table) = references.table(version) else {
        tracing::debug!(
            schema_version = version,
            "no reference table for schema version, skipping extensions"
        );
        return ExtendStats::default();
    };
    log_op_start!(
        "extend",
        container_id = scope.container_id.as_str(),
        schema_version = version
    );

    let mut stats = ExtendStats::default();
    for (object_type, refs) in table.entries() {
        let Some(ref_key) = refs.first() else {
            continue;
        };
        for record in scope.record.find_all(object_type) {
            stats.candidates += 1;
            let mut extension = ObjectNode::new(
                record.attr(&config.identifier_attribute).unwrap_or_default(),
                record.tag.as_str(),
                scope.container_id.clone(),
                scope.identity.clone(),
            );
            extension.fields = canonicalize(record, config);
            extension.location = GeographicLocation::find(record, &config.identifier_attribute);

            let Some(target) = extension.fields.text(ref_key).map(str::to_string) else {
                stats.rejected += 1;
                ledger.record(
                    ExErrorKind::UnconnectedExtension,
                    Severity::Warning,
                    extension.tag.as_str(),
                    format!(
                        "{} has no {}, can not extend object",
                        extension.path, ref_key
                    ),
                    Some(scope.container_id),
                );
                continue;
            };

            match resolve(graph, ledger, &extension, &target, scope) {
                0 => stats.rejected += 1,
                n => stats.accepted += n,
            }
        }
    }

    log_op_end!(
        "extend",
        duration_ms = start.elapsed().as_millis() as u64,
        accepted = stats.accepted,
        rejected = stats.rejected
    );
    stats
}

/// Attach `extension` to every base node of `target` that passes the
/// lineage check. Returns how many accepted it.
fn resolve(
    graph: &mut ObjectGraph,
    ledger: &mut Ledger,
    extension: &ObjectNode,
    target: &str,
    scope: DocumentScope<'_>,
) -> usize {
    let Some(bases) = graph.get_mut(target) else {
        ledger.record(
            ExErrorKind::UnconnectedExtension,
            Severity::Warning,
            target,
            format!(
                "{} reffed object with {} not present in dataset, can not extend object",
                extension.path, target
            ),
            Some(scope.container_id),
        );
        return 0;
    };

    let namespace = format!("{}{}", EXTENSION_PREFIX, extension.tag);
    let mut accepted = 0;
    for base in bases.iter_mut() {
        if !extension.document.is_lineage_of(&base.document) {
            ledger.record(
                ExErrorKind::UnconnectedExtension,
                Severity::Warning,
                target,
                format!(
                    "{} hash of base reference file is not valid, can not extend {} with puic {}",
                    extension.path, base.path, base.puic
                ),
                Some(scope.container_id),
            );
            continue;
        }
        base.extensions.push(extension.clone());
        base.fields.merge_namespaced(&namespace, &extension.fields);
        accepted += 1;
    }
    accepted
}
