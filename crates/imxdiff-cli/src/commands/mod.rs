//! Command implementations

pub mod diff;
pub mod inspect;
pub mod timeline;

use clap::{Args, ValueEnum};
use imxdiff_core::{
    CanonicalConfig, DiffOptions, IngestContext, MultiRepository, PlanarGeometry,
    ReferenceConfig, Repository,
};
use imxdiff_reader::situation::{ingest_situation, situations};
use imxdiff_reader::{ingest_document, load, load_container, LoadOptions, SituationKind};
use std::path::{Path, PathBuf};

pub type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SituationArg {
    Situation,
    Initial,
    New,
}

impl From<SituationArg> for SituationKind {
    fn from(arg: SituationArg) -> Self {
        match arg {
            SituationArg::Situation => SituationKind::Situation,
            SituationArg::Initial => SituationKind::InitialSituation,
            SituationArg::New => SituationKind::NewSituation,
        }
    }
}

/// Inputs of the comparing commands
#[derive(Debug, Args)]
pub struct CompareInputs {
    /// Documents or container directories, oldest first
    #[arg(required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Display name per input, in input order (default: file stem)
    #[arg(long = "alias")]
    pub aliases: Vec<String>,

    /// Situation used for single-file documents
    #[arg(long, value_enum)]
    pub situation: Option<SituationArg>,

    /// Compare inputs with differing schema versions
    #[arg(long)]
    pub ignore_version: bool,
}

impl CompareInputs {
    /// Load every input as one repository and merge them in input order.
    pub fn load(&self) -> CommandResult<(MultiRepository, DiffOptions)> {
        if self.aliases.len() > self.paths.len() {
            return Err(format!(
                "{} aliases given for {} inputs",
                self.aliases.len(),
                self.paths.len()
            )
            .into());
        }

        let canonical = CanonicalConfig::default();
        let references = ReferenceConfig::builtin();
        let ctx = IngestContext::new(&canonical, &references).with_geometry(&PlanarGeometry);

        let mut repositories = Vec::with_capacity(self.paths.len());
        let mut options = DiffOptions::default();
        for (index, path) in self.paths.iter().enumerate() {
            let repo = load_input(path, self.situation.map(SituationKind::from), &ctx)?;
            let alias = self
                .aliases
                .get(index)
                .cloned()
                .unwrap_or_else(|| default_alias(path));
            options = options.with_alias(repo.container_id().clone(), alias);
            repositories.push(repo);
        }

        let multi = MultiRepository::from_owned(repositories, !self.ignore_version)?;
        Ok((multi, options))
    }
}

/// Load one input as a single repository.
///
/// A single-file document without `situation` uses its first situation
/// section, or the whole document when it has none.
pub fn load_input(
    path: &Path,
    situation: Option<SituationKind>,
    ctx: &IngestContext<'_>,
) -> CommandResult<Repository> {
    let options = LoadOptions::default();
    if path.is_dir() {
        return Ok(load_container(path, ctx, &options)?);
    }

    let doc = load(path)?;
    let kind = situation.or_else(|| situations(&doc.root).first().map(|(kind, _)| *kind));
    match kind {
        Some(kind) => Ok(ingest_situation(&doc, kind, ctx, &options)?),
        None => ingest_document(&doc, ctx, &options)?
            .into_iter()
            .next()
            .ok_or_else(|| format!("{} produced no repository", path.display()).into()),
    }
}

pub fn default_alias(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
