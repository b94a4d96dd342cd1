//! imxdiff core - in-memory ingestion and multi-version diffing
//!
//! This crate turns parsed interchange records into an addressable object
//! graph and compares ordered sequences of such graphs:
//! - Canonicalization of nested records into order-independent field maps
//! - Object graph building with parent and descendant linkage
//! - Extension resolution across documents of one container
//! - Rail connection geometry assembly
//! - Repositories and merged multi-repositories
//! - Per-field and per-object change classification
//!
//! Everything here is pure and synchronous. Parsing documents from disk lives
//! in `imxdiff-reader`.

pub mod builder;
pub mod canonical;
pub mod config;
pub mod connectivity;
pub mod diff;
pub mod digest;
pub mod errors;
pub mod extension;
pub mod geometry;
pub mod graph;
pub mod ledger;
pub mod logging_facility;
pub mod model;
pub mod repo;

// Re-export commonly used types
pub use canonical::canonicalize;
pub use config::{CanonicalConfig, DiffOptions};
pub use diff::{compare, CompareStatus, MultiDiff};
pub use errors::{ExError, ExErrorKind, ImxError, Result};
pub use extension::{ReferenceConfig, ReferenceTable};
pub use geometry::{Geometry, GeometryProvider, PlanarGeometry};
pub use graph::{MergedGraph, ObjectGraph};
pub use ledger::{DiagnosticSink, Ledger, LedgerEntry, Severity, TracingSink};
pub use model::{DocumentIdentity, FieldMap, FieldValue, ObjectNode, Record};
pub use repo::{IngestContext, MultiRepository, Repository};
pub use imxdiff_core_types::ContainerId;

#[doc(hidden)]
pub mod __private {
    pub use imxdiff_core_types::schema;
    pub use tracing;
}
