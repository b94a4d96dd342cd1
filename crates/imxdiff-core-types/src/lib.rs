//! Core types shared across the imxdiff crates
//!
//! This crate provides foundational types used by the core, the document
//! reader and the CLI:
//!
//! - **Container identity**: `ContainerId`, the opaque stable id of one ingested dataset
//! - **Schema constants**: Canonical field keys and event names for structured logging

pub mod container;
pub mod schema;

pub use container::ContainerId;
