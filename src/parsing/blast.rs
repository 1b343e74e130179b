//! Parser for BLAST tabular (`-outfmt "6 ..."`) reports.
//!
//! Expects the 16 columns listed in the module docs of [`crate::parsing`]. Lines
//! that do not parse are skipped with a warning rather than failing the whole
//! report.

use std::path::Path;
use tracing::{debug, warn};

use crate::core::hit::{AlignmentHit, HitSource};
use crate::parsing::{read_text, ParseError};
use crate::utils::validation::check_record_limit;

/// Number of columns in the expected report layout
pub const BLAST_COLUMNS: usize = 16;

/// Parse a BLAST tabular report from a file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read or
/// `ParseError::TooManyRecords` if the limit is exceeded.
pub fn parse_blast_file(path: &Path) -> Result<HitSource, ParseError> {
    let text = read_text(path)?;
    parse_blast_text(&text)
}

/// Parse BLAST tabular text
///
/// # Errors
///
/// Returns `ParseError::TooManyRecords` if the limit is exceeded.
pub fn parse_blast_text(text: &str) -> Result<HitSource, ParseError> {
    let mut hits = HitSource::new();
    let mut count = 0;
    let mut skipped = 0;

    for (i, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_line(line) {
            Ok((query, hit)) => {
                if check_record_limit(count).is_some() {
                    return Err(ParseError::TooManyRecords(count));
                }
                hits.add(query, hit);
                count += 1;
            }
            Err(reason) => {
                // Line numbers in warnings are 1-based
                warn!("Skipping BLAST line {}: {reason}", i + 1);
                skipped += 1;
            }
        }
    }

    debug!(
        "Parsed {count} BLAST hits for {} queries ({skipped} lines skipped)",
        hits.len()
    );
    Ok(hits)
}

fn field<T: std::str::FromStr>(fields: &[&str], index: usize, name: &str) -> Result<T, String> {
    fields[index]
        .trim()
        .parse()
        .map_err(|_| format!("invalid {name} '{}'", fields[index]))
}

fn parse_line(line: &str) -> Result<(String, AlignmentHit), String> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < BLAST_COLUMNS {
        return Err(format!(
            "expected {BLAST_COLUMNS} columns, found {}",
            fields.len()
        ));
    }

    let query = fields[0].trim().to_string();
    let sseqid = fields[1].trim();
    let percent_identity: f64 = field(&fields, 2, "pident")?;
    let query_from: i64 = field(&fields, 6, "qstart")?;
    let query_to: i64 = field(&fields, 7, "qend")?;
    let subject_start: i64 = field(&fields, 8, "sstart")?;
    let subject_end: i64 = field(&fields, 9, "send")?;
    let evalue: f64 = field(&fields, 10, "evalue")?;
    let bit_score: f64 = field(&fields, 11, "bitscore")?;
    let query_len: i64 = field(&fields, 12, "qlen")?;
    let subject_len: i64 = field(&fields, 13, "slen")?;

    let mut subject_ids: Vec<String> = fields[14]
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "N/A")
        .map(str::to_string)
        .collect();
    if subject_ids.is_empty() && !sseqid.is_empty() {
        subject_ids.push(sseqid.to_string());
    }
    let title = fields[15].trim();
    let subject = if title.is_empty() || title == "N/A" {
        sseqid
    } else {
        title
    };

    let mut hit = AlignmentHit::new(subject, subject_ids)
        .query(query_from, query_to, query_len)
        .subject(
            subject_start.min(subject_end),
            subject_start.max(subject_end),
            subject_len,
        );
    hit.percent_identity = percent_identity;
    hit.evalue = evalue;
    hit.bit_score = bit_score;

    if !hit.is_well_formed() {
        return Err(format!(
            "aligned range outside the sequence (query {query_from}-{query_to}/{query_len})"
        ));
    }
    Ok((query, hit))
}
