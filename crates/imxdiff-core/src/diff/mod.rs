//! Multi-version diff engine.
//!
//! Compares every identifier of a [`crate::MultiRepository`] across its
//! containers, field by field, and classifies what changed where.
//!
//! ## Entry point
//!
//! ```ignore
//! use imxdiff_core::diff::compare;
//!
//! let diff = compare(&multi, &DiffOptions::default());
//! let summary = imxdiff_core::diff::render_human_summary(&diff);
//! ```
//!
//! ## Guarantees
//!
//! - **Slot order**: every field sequence has one slot per container, in the
//!   multi-repository's container order.
//! - **Determinism**: objects are keyed by identifier in a `BTreeMap`, fields
//!   are ordered priority-first then lexicographically.
//! - **Absent is not empty**: a missing field and an empty string are
//!   different values to the status machine.
//! - **Aliases are presentation only**: they never change a status.

pub mod engine;
pub mod model;
pub mod status;
pub mod summary;
pub mod timeline;

pub use engine::compare;
pub use model::{ComparedObject, ContainerStatus, FieldComparison, FieldSlot, MultiDiff};
pub use status::CompareStatus;
pub use summary::render_human_summary;
pub use timeline::{render_timeline, timeline};
