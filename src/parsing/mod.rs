//! Parsers turning the tool outputs consumed by the analysis into records.
//!
//! This module provides parsers for:
//!
//! - **BLAST tabular reports**: homology hits of the annotated proteins
//! - **tRNAscan-SE tables**: external tRNA predictions
//! - **rRNA GFF files**: external rRNA predictions (barrnap, RNAmmer)
//!
//! All inputs may be gzip compressed (`.gz`, `.bgz`).
//!
//! ## Example
//!
//! ```rust,no_run
//! use annot_qc::parsing::blast::parse_blast_file;
//! use std::path::Path;
//!
//! let hits = parse_blast_file(Path::new("proteins.blastp.tsv.gz")).unwrap();
//! println!("{} queries with hits", hits.len());
//! ```
//!
//! ## BLAST columns
//!
//! | Column | Field |
//! |--------|-------|
//! | 1 | qseqid |
//! | 2 | sseqid |
//! | 3-6 | pident, length, mismatch, gapopen |
//! | 7-8 | qstart, qend |
//! | 9-10 | sstart, send |
//! | 11-12 | evalue, bitscore |
//! | 13-14 | qlen, slen |
//! | 15 | sallseqid (`;` separated) |
//! | 16 | stitle |

pub mod blast;
pub mod rrna;
pub mod trnascan;

use std::io::Read;
use std::path::Path;

use flate2::read::MultiGzDecoder;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Too many records: {0} exceeds maximum allowed")]
    TooManyRecords(usize),
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Read a whole text file, decompressing gzip/bgzip by extension
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read or decompressed.
pub fn read_text(path: &Path) -> Result<String, ParseError> {
    let file = std::fs::File::open(path)?;
    let mut text = String::new();
    if is_gzipped(path) {
        MultiGzDecoder::new(file).read_to_string(&mut text)?;
    } else {
        std::io::BufReader::new(file).read_to_string(&mut text)?;
    }
    Ok(text)
}

/// Like [`read_text`], but a missing file is an empty input
///
/// # Errors
///
/// Returns `ParseError::Io` if an existing file cannot be read.
pub fn read_optional_text(path: &Path) -> Result<Option<String>, ParseError> {
    if !path.exists() {
        warn!(
            "Prediction file {} not found, treating it as empty",
            path.display()
        );
        return Ok(None);
    }
    read_text(path).map(Some)
}
