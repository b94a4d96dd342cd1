//! Timeline command
//!
//! Usage: imxdiff timeline <PATH>... [--alias <NAME>]...

use super::{CommandResult, CompareInputs};
use clap::Args;
use imxdiff_core::compare;
use imxdiff_core::diff::timeline;

#[derive(Debug, Args)]
pub struct TimelineArgs {
    #[command(flatten)]
    pub inputs: CompareInputs,
}

/// Execute timeline command
pub fn execute(args: TimelineArgs) -> CommandResult<()> {
    print!("{}", render(&args)?);
    Ok(())
}

pub fn render(args: &TimelineArgs) -> CommandResult<String> {
    let (multi, options) = args.inputs.load()?;
    let diff = compare(&multi, &options);
    Ok(format!("{}\n", serde_json::to_string_pretty(&timeline(&diff))?))
}
