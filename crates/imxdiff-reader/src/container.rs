//! Multi-document containers.
//!
//! A container is a directory of XML documents that together describe one
//! dataset version. The core design document goes first so that extension
//! documents resolve against it; the rest follow in file-name order.

use crate::document::{load, Document};
use crate::errors::{empty_container, io_error, Result};
use crate::LoadOptions;
use imxdiff_core::{log_op_end, log_op_start};
use imxdiff_core::{ImxError, IngestContext, Record, Repository};
use imxdiff_core_types::ContainerId;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const CORE_DESIGN_TAG: &str = "SignalingDesign";

/// Parsed documents of a container plus any non-XML files found beside them.
#[derive(Debug, Clone)]
pub struct ContainerFiles {
    pub documents: Vec<Document>,
    pub additional_files: Vec<PathBuf>,
}

impl ContainerFiles {
    pub fn schema_version(&self) -> Option<&str> {
        self.documents.first().map(Document::schema_version)
    }

    pub fn core_design(&self) -> Option<&Document> {
        self.documents.iter().find(|d| d.root_tag() == CORE_DESIGN_TAG)
    }
}

fn is_xml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

/// Read and parse every document of a container directory.
///
/// # Errors
///
/// IO and parse errors, `ERR_INVALID_INPUT` for a directory without XML
/// documents, `ERR_VERSION_MISMATCH` when documents disagree on the schema
/// version.
pub fn read_container(dir: &Path) -> Result<ContainerFiles> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_error("read_dir", dir, e))? {
        let path = entry.map_err(|e| io_error("read_dir", dir, e))?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut documents = Vec::new();
    let mut additional_files = Vec::new();
    for path in paths {
        if is_xml(&path) {
            documents.push(load(&path)?);
        } else {
            additional_files.push(path);
        }
    }
    if documents.is_empty() {
        return Err(empty_container(dir));
    }
    documents.sort_by_key(|d| d.root_tag() != CORE_DESIGN_TAG);

    let versions: BTreeSet<&str> = documents.iter().map(Document::schema_version).collect();
    if versions.len() > 1 {
        return Err(ImxError::VersionMismatch {
            versions: versions.into_iter().map(str::to_string).collect(),
        }
        .into());
    }

    Ok(ContainerFiles {
        documents,
        additional_files,
    })
}

/// Ingest parsed container documents as one repository.
///
/// # Errors
///
/// Ingestion and drain errors.
pub fn ingest_container(
    files: &ContainerFiles,
    ctx: &IngestContext<'_>,
    options: &LoadOptions,
) -> Result<Repository> {
    let documents: Vec<(&Record, _)> = files
        .documents
        .iter()
        .map(|d| (&d.root, d.identity.clone()))
        .collect();
    let repo = Repository::ingest(ContainerId::new(), &documents, ctx)?;
    options.finish(repo)
}

/// Read a container directory and ingest it.
///
/// # Errors
///
/// As [`read_container`] and [`ingest_container`].
pub fn load_container(
    dir: &Path,
    ctx: &IngestContext<'_>,
    options: &LoadOptions,
) -> Result<Repository> {
    let start = Instant::now();
    log_op_start!("load_container", path = %dir.display());

    let files = read_container(dir)?;
    let repo = ingest_container(&files, ctx, options)?;

    log_op_end!(
        "load_container",
        duration_ms = start.elapsed().as_millis() as u64,
        container_id = repo.container_id().as_str(),
        object_count = repo.graph().len(),
        additional_files = files.additional_files.len()
    );
    Ok(repo)
}
