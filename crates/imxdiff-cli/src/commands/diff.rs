//! Diff command
//!
//! Usage: imxdiff diff <PATH>... [--alias <NAME>]... [--json] [--ignore-version]

use super::{CommandResult, CompareInputs};
use clap::Args;
use imxdiff_core::diff::render_human_summary;
use imxdiff_core::{compare, log_op_end, log_op_start};
use std::time::Instant;

#[derive(Debug, Args)]
pub struct DiffArgs {
    #[command(flatten)]
    pub inputs: CompareInputs,

    /// Print the full comparison as JSON instead of the summary
    #[arg(long)]
    pub json: bool,

    /// Leave extension fields out of the comparison
    #[arg(long)]
    pub no_extensions: bool,
}

/// Execute diff command
pub fn execute(args: DiffArgs) -> CommandResult<()> {
    print!("{}", render(&args)?);
    Ok(())
}

pub fn render(args: &DiffArgs) -> CommandResult<String> {
    let start = Instant::now();
    log_op_start!("cli_diff", input_count = args.inputs.paths.len());

    let (multi, mut options) = args.inputs.load()?;
    if args.no_extensions {
        options = options.without_extensions();
    }
    let diff = compare(&multi, &options);

    let out = if args.json {
        format!("{}\n", serde_json::to_string_pretty(&diff)?)
    } else {
        render_human_summary(&diff)
    };

    log_op_end!(
        "cli_diff",
        duration_ms = start.elapsed().as_millis() as u64,
        object_count = diff.objects.len()
    );
    Ok(out)
}
