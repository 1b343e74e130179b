//! Command-line interface for annot-qc.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **check**: Run the quality-control analysis on an annotated genome
//! - **thresholds**: Print the default thresholds as JSON
//!
//! ## Usage
//!
//! ```text
//! # Check an annotation against BLAST hits and RNA predictions
//! annot-qc check --document genome.json --hits proteins.blastp.tsv \
//!     --trna genome.trnascan --rrna genome.rrna.gff --report-dir qc/
//!
//! # Write an annotated copy with problem records removed
//! annot-qc check --document genome.json --annotate --remove --output cleaned.json
//!
//! # Start from the defaults when writing a thresholds file
//! annot-qc thresholds > thresholds.json
//! ```

use clap::{Parser, Subcommand};

pub mod check;
pub mod thresholds;

#[derive(Parser)]
#[command(name = "annot-qc")]
#[command(version)]
#[command(about = "Quality control of draft genome annotations")]
#[command(
    long_about = "annot-qc checks a draft genome annotation against independent evidence.\n\nIt uses protein homology hits and external tRNA/rRNA predictions to report:\n- Overlapping genes and RNA/CDS collisions\n- Likely frameshifts between adjacent proteins\n- Missing, misplaced or wrong-strand RNAs\n- Short and truncated proteins\n\nProblem records can be annotated in place or removed."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check an annotated genome
    Check(check::CheckArgs),

    /// Print the default thresholds
    Thresholds(thresholds::ThresholdsArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
