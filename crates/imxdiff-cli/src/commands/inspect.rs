//! Inspect command
//!
//! Usage: imxdiff inspect <PATH> [--json]

use super::CommandResult;
use clap::Args;
use imxdiff_core::{CanonicalConfig, IngestContext, PlanarGeometry, ReferenceConfig, Repository};
use imxdiff_reader::{load_path, LoadOptions};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Document or container directory
    pub path: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute inspect command
pub fn execute(args: InspectArgs) -> CommandResult<()> {
    print!("{}", render(&args)?);
    Ok(())
}

/// Ingest without draining so the ledger is reported instead of aborting.
pub fn render(args: &InspectArgs) -> CommandResult<String> {
    let canonical = CanonicalConfig::default();
    let references = ReferenceConfig::builtin();
    let ctx = IngestContext::new(&canonical, &references).with_geometry(&PlanarGeometry);
    let repositories = load_path(&args.path, &ctx, &LoadOptions::without_drain())?;

    if args.json {
        let reports: Vec<serde_json::Value> = repositories.iter().map(json_report).collect();
        return Ok(format!("{}\n", serde_json::to_string_pretty(&reports)?));
    }

    let mut out = String::new();
    for repo in &repositories {
        text_report(&mut out, repo)?;
    }
    Ok(out)
}

fn type_counts(repo: &Repository) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for node in repo.graph().nodes() {
        *counts.entry(node.tag.as_str()).or_insert(0) += 1;
    }
    counts
}

fn text_report(out: &mut String, repo: &Repository) -> std::fmt::Result {
    writeln!(out, "## {}", repo.situation().unwrap_or("document"))?;
    writeln!(out, "container: {}", repo.container_id())?;
    writeln!(
        out,
        "schema version: {}",
        repo.schema_version().unwrap_or("unknown")
    )?;
    writeln!(out, "objects: {}", repo.graph().node_count())?;
    for (tag, count) in type_counts(repo) {
        writeln!(out, "  {}: {}", tag, count)?;
    }
    writeln!(out, "ledger: {}", repo.ledger().len())?;
    for entry in repo.ledger().entries() {
        writeln!(
            out,
            "  {} {} {}: {}",
            entry.severity,
            entry.kind.code(),
            entry.puic,
            entry.message
        )?;
    }
    writeln!(out)
}

fn json_report(repo: &Repository) -> serde_json::Value {
    json!({
        "situation": repo.situation(),
        "container_id": repo.container_id(),
        "schema_version": repo.schema_version(),
        "objects": type_counts(repo),
        "ledger": repo.ledger().entries(),
    })
}
