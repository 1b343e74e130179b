use std::path::PathBuf;

use clap::Args;

use crate::analysis::engine::Thresholds;
use crate::cli::OutputFormat;

#[derive(Args)]
pub struct ThresholdsArgs {
    /// Show the thresholds from this file (defaults filled in) instead of the defaults
    #[arg(long)]
    pub from: Option<PathBuf>,
}

/// Execute thresholds subcommand
///
/// # Errors
///
/// Returns an error if the thresholds file cannot be loaded.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ThresholdsArgs, _format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let thresholds = match &args.from {
        Some(path) => {
            if verbose {
                eprintln!("Loading thresholds from {}", path.display());
            }
            Thresholds::load_from_file(path)?
        }
        None => Thresholds::default(),
    };
    println!("{}", serde_json::to_string_pretty(&thresholds)?);
    Ok(())
}
