//! imxdiff reader - XML interchange documents into core repositories
//!
//! Provides:
//! - Document parsing into the core `Record` tree with document identity
//! - Situation splitting for single-file projects
//! - Multi-document container loading from a directory
//!
//! Every loader drains the resulting ledger through the tracing sink unless
//! told not to; a CRITICAL entry then aborts the load.

pub mod container;
pub mod document;
pub mod errors;
pub mod situation;

pub use container::{load_container, read_container, ContainerFiles};
pub use document::{load, parse_str, Document};
pub use errors::Result;
pub use situation::{ingest_document, load_file, SituationKind};

use imxdiff_core::{IngestContext, Repository, TracingSink};
use std::path::Path;

/// Options shared by the loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Drain the ledger through [`TracingSink`] after ingestion
    pub drain: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { drain: true }
    }
}

impl LoadOptions {
    pub fn without_drain() -> Self {
        Self { drain: false }
    }

    fn finish(&self, repo: Repository) -> Result<Repository> {
        if self.drain {
            repo.drain_ledger(&mut TracingSink)?;
        }
        Ok(repo)
    }
}

/// Load a container directory as one repository, or a single file as one
/// repository per situation.
///
/// # Errors
///
/// IO, parse, ingestion and drain errors.
pub fn load_path(
    path: &Path,
    ctx: &IngestContext<'_>,
    options: &LoadOptions,
) -> Result<Vec<Repository>> {
    if path.is_dir() {
        Ok(vec![load_container(path, ctx, options)?])
    } else {
        load_file(path, ctx, options)
    }
}
