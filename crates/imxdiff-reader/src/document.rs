//! XML interchange documents.
//!
//! Parses a document into the core [`Record`] tree using local names only,
//! and derives its [`DocumentIdentity`]: the SHA-256 of the raw bytes, the
//! declared `imxVersion`, and the `parentHashcode` of its `BaseReference`
//! when it extends another document.

use crate::errors::{io_error, missing_version, parse_error, Result};
use imxdiff_core::digest::hash_bytes;
use imxdiff_core::{log_op_end, log_op_error, log_op_start};
use imxdiff_core::{DocumentIdentity, Record};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const VERSION_ATTRIBUTE: &str = "imxVersion";
pub const BASE_REFERENCE_TAG: &str = "BaseReference";
pub const PARENT_HASH_ATTRIBUTE: &str = "parentHashcode";

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// A parsed document and its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Record,
    pub identity: DocumentIdentity,
    pub path: Option<PathBuf>,
}

impl Document {
    /// Tag of the root element, e.g. `SignalingDesign` or `Project`.
    pub fn root_tag(&self) -> &str {
        &self.root.tag
    }

    pub fn schema_version(&self) -> &str {
        &self.identity.schema_version
    }

    /// File name, falling back to the root tag for in-memory documents.
    pub fn name(&self) -> &str {
        self.identity.name.as_deref().unwrap_or(&self.root.tag)
    }
}

/// Parse a document from text.
///
/// # Errors
///
/// `ERR_PARSE` for malformed XML, `ERR_MISSING_VERSION` when no element
/// declares `imxVersion`.
pub fn parse_str(text: &str, path: Option<&Path>) -> Result<Document> {
    let xml = roxmltree::Document::parse(text).map_err(|e| parse_error(path, e))?;
    let root = to_record(xml.root_element());

    let schema_version = std::iter::once(&root)
        .chain(root.descendants())
        .find_map(|r| r.attr(VERSION_ATTRIBUTE))
        .ok_or_else(|| missing_version(path))?
        .to_string();

    let mut identity = DocumentIdentity::new(hash_bytes(text.as_bytes()), schema_version);
    if let Some(base) = root
        .find_first(BASE_REFERENCE_TAG)
        .and_then(|r| r.attr(PARENT_HASH_ATTRIBUTE))
        .filter(|h| !h.trim().is_empty())
    {
        identity = identity.with_base_hash(base.trim().to_ascii_lowercase());
    }
    if let Some(name) = path.and_then(Path::file_name) {
        identity = identity.with_name(name.to_string_lossy());
    }

    Ok(Document {
        root,
        identity,
        path: path.map(Path::to_path_buf),
    })
}

/// Read and parse a document from disk.
///
/// # Errors
///
/// `ERR_IO` when the file can not be read, otherwise as [`parse_str`].
pub fn load(path: &Path) -> Result<Document> {
    let start = Instant::now();
    log_op_start!("load_document", path = %path.display());

    let result = std::fs::read_to_string(path)
        .map_err(|e| io_error("read", path, e))
        .and_then(|text| parse_str(&text, Some(path)));

    match &result {
        Ok(doc) => log_op_end!(
            "load_document",
            duration_ms = start.elapsed().as_millis() as u64,
            document_hash = doc.identity.content_hash.as_str(),
            schema_version = doc.schema_version()
        ),
        Err(err) => log_op_error!(
            "load_document",
            err.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        ),
    }
    result
}

fn to_record(node: roxmltree::Node<'_, '_>) -> Record {
    let mut record = Record::new(node.tag_name().name());
    for attribute in node.attributes() {
        if attribute.namespace() == Some(XSI_NAMESPACE) {
            continue;
        }
        record.set_attr(attribute.name(), attribute.value());
    }

    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            record.children.push(to_record(child));
        } else if child.is_text() {
            text.push_str(child.text().unwrap_or_default());
        }
    }
    if !text.trim().is_empty() {
        record.text = Some(text);
    }
    record
}
