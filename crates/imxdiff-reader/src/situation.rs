//! Single-file documents and their situations.
//!
//! A single-file project holds up to three situation sections. Each one is
//! ingested as its own repository, scoped to that section.

use crate::document::{load, Document};
use crate::errors::{missing_situation, Result};
use crate::LoadOptions;
use imxdiff_core::{IngestContext, Record, Repository};
use imxdiff_core_types::ContainerId;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SituationKind {
    Situation,
    InitialSituation,
    NewSituation,
}

impl SituationKind {
    pub const ALL: [SituationKind; 3] = [
        SituationKind::Situation,
        SituationKind::InitialSituation,
        SituationKind::NewSituation,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            SituationKind::Situation => "Situation",
            SituationKind::InitialSituation => "InitialSituation",
            SituationKind::NewSituation => "NewSituation",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }
}

/// Situation sections present in a document, in [`SituationKind::ALL`] order.
pub fn situations(root: &Record) -> Vec<(SituationKind, &Record)> {
    SituationKind::ALL
        .into_iter()
        .filter_map(|kind| root.find_first(kind.tag()).map(|r| (kind, r)))
        .collect()
}

/// Ingest one situation of a document.
///
/// # Errors
///
/// `ERR_NOT_FOUND` when the document lacks the situation; ingestion and
/// drain errors otherwise.
pub fn ingest_situation(
    doc: &Document,
    kind: SituationKind,
    ctx: &IngestContext<'_>,
    options: &LoadOptions,
) -> Result<Repository> {
    let section = doc
        .root
        .find_first(kind.tag())
        .ok_or_else(|| missing_situation(doc.path.as_deref(), kind.tag()))?;
    let repo = Repository::ingest(
        ContainerId::new(),
        &[(section, doc.identity.clone())],
        ctx,
    )?
    .with_situation(kind.tag());
    options.finish(repo)
}

/// Ingest every situation of a document, or the whole document when it has
/// no situation sections.
///
/// # Errors
///
/// Ingestion and drain errors.
pub fn ingest_document(
    doc: &Document,
    ctx: &IngestContext<'_>,
    options: &LoadOptions,
) -> Result<Vec<Repository>> {
    let found = situations(&doc.root);
    if found.is_empty() {
        let repo = Repository::ingest(
            ContainerId::new(),
            &[(&doc.root, doc.identity.clone())],
            ctx,
        )?;
        return Ok(vec![options.finish(repo)?]);
    }
    found
        .into_iter()
        .map(|(kind, _)| ingest_situation(doc, kind, ctx, options))
        .collect()
}

/// Load a single-file document from disk and ingest its situations.
///
/// # Errors
///
/// IO, parse, ingestion and drain errors.
pub fn load_file(
    path: &Path,
    ctx: &IngestContext<'_>,
    options: &LoadOptions,
) -> Result<Vec<Repository>> {
    let doc = load(path)?;
    ingest_document(&doc, ctx, options)
}
