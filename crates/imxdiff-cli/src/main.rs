//! imxdiff CLI
//!
//! Command-line interface for inspecting and comparing IMX datasets

use clap::{Parser, Subcommand, ValueEnum};
use imxdiff_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "imxdiff")]
#[command(about = "imxdiff - Multi-version comparison of IMX datasets", long_about = None)]
struct Cli {
    /// Emit diagnostics and operation events on stderr
    #[arg(long, global = true, value_enum)]
    log: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Object counts and ledger of one document or container
    Inspect(commands::inspect::InspectArgs),
    /// Compare datasets in argument order
    Diff(commands::diff::DiffArgs),
    /// Per-field timelines of datasets in argument order
    Timeline(commands::timeline::TimelineArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.log {
        Some(LogFormat::Text) => init(Profile::Development),
        Some(LogFormat::Json) => init(Profile::Production),
        None => {}
    }

    let result = match cli.command {
        Commands::Inspect(args) => commands::inspect::execute(args),
        Commands::Diff(args) => commands::diff::execute(args),
        Commands::Timeline(args) => commands::timeline::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
