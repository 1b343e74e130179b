//! Parser for tRNAscan-SE tabular output.
//!
//! ```text
//! Sequence    tRNA    Bounds  Bounds  tRNA    Anti    Intron Bounds   Inf
//! Name        tRNA #  Begin   End     Type    Codon   Begin   End     Score   Note
//! --------    ------  -----   ------  ----    -----   -----   ----    ------  ------
//! contig1     1       501     573     Ala     TGC     0       0       74.3
//! contig1     2       2072    2000    Gly     GCC     0       0       62.0    pseudo
//! ```
//!
//! Coordinates are 1-based; `Begin > End` marks the minus strand.

use std::path::Path;

use crate::core::record::{Exon, ExternalRnaRecord, NormalizedRecord};
use crate::core::types::{AminoAcid, RecordKind, Strand, TrnaStatus};
use crate::parsing::{read_optional_text, ParseError};
use crate::utils::validation::check_record_limit;

pub const TRNASCAN_METHOD: &str = "tRNAscan-SE";

/// Parse a tRNAscan-SE table; a missing file yields no predictions
///
/// # Errors
///
/// Returns `ParseError::Io` if the file exists but cannot be read, or the errors
/// of [`parse_trnascan_text`].
pub fn parse_trnascan_file(path: &Path) -> Result<Vec<ExternalRnaRecord>, ParseError> {
    match read_optional_text(path)? {
        Some(text) => parse_trnascan_text(&text),
        None => Ok(Vec::new()),
    }
}

/// Parse tRNAscan-SE tabular text
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for a data line with too few columns or an
/// unparseable score, or `ParseError::TooManyRecords` if the limit is exceeded.
pub fn parse_trnascan_text(text: &str) -> Result<Vec<ExternalRnaRecord>, ParseError> {
    let mut records = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        // Header lines have no numeric bounds
        let (Some(begin), Some(end)) = (
            fields.get(2).and_then(|s| s.parse::<i64>().ok()),
            fields.get(3).and_then(|s| s.parse::<i64>().ok()),
        ) else {
            continue;
        };

        let line_num = i + 1;
        if fields.len() < 9 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has {} columns, expected at least 9",
                fields.len()
            )));
        }
        let intron_begin: i64 = fields[6].parse().unwrap_or(0);
        let intron_end: i64 = fields[7].parse().unwrap_or(0);
        let score: f64 = fields[8].parse().map_err(|_| {
            ParseError::InvalidFormat(format!(
                "Invalid score on line {line_num}: '{}'",
                fields[8]
            ))
        })?;
        let isotype = fields[4];
        let note = fields[9..].join(" ").to_lowercase();

        let strand = if begin > end { Strand::Minus } else { Strand::Plus };
        let (lo, hi) = (begin.min(end) - 1, begin.max(end) - 1);
        let exons = if intron_begin > 0 && intron_end > 0 {
            let (ilo, ihi) = (intron_begin.min(intron_end) - 1, intron_begin.max(intron_end) - 1);
            vec![Exon::new(lo, ilo - 1, strand), Exon::new(ihi + 1, hi, strand)]
        } else {
            vec![Exon::new(lo, hi, strand)]
        };

        let pseudo = isotype.eq_ignore_ascii_case("pseudo") || note.contains("pseudo");
        let amino_acid = AminoAcid::parse(isotype);
        let kind = RecordKind::Trna {
            amino_acid,
            status: if pseudo {
                TrnaStatus::Pseudo
            } else {
                TrnaStatus::Normal
            },
        };
        let name = match amino_acid {
            Some(aa) => format!("tRNA-{aa}"),
            None => format!("tRNA-{isotype}"),
        };
        let Some(record) = NormalizedRecord::new(kind, exons, 0) else {
            continue;
        };

        if check_record_limit(records.len()).is_some() {
            return Err(ParseError::TooManyRecords(records.len()));
        }
        records.push(
            ExternalRnaRecord::new(fields[0], record.with_name(name), TRNASCAN_METHOD)
                .with_score(score),
        );
    }

    Ok(records)
}
