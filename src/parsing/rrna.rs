//! Parser for rRNA predictions in GFF3 (barrnap, RNAmmer).

use std::path::Path;

use crate::core::record::{ExternalRnaRecord, NormalizedRecord};
use crate::core::types::{RecordKind, Strand};
use crate::parsing::{read_optional_text, ParseError};
use crate::utils::validation::check_record_limit;

/// Value of a `key=value` attribute in GFF column 9
fn attribute<'a>(attributes: &'a str, key: &str) -> Option<&'a str> {
    attributes
        .split(';')
        .filter_map(|kv| kv.trim().split_once('='))
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.trim())
}

/// Parse an rRNA GFF file; a missing file yields no predictions
///
/// # Errors
///
/// Returns `ParseError::Io` if the file exists but cannot be read, or the errors
/// of [`parse_rrna_text`].
pub fn parse_rrna_file(path: &Path) -> Result<Vec<ExternalRnaRecord>, ParseError> {
    match read_optional_text(path)? {
        Some(text) => parse_rrna_text(&text),
        None => Ok(Vec::new()),
    }
}

/// Parse rRNA GFF text; only `rRNA` features are kept
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if an rRNA line has fewer than 9 columns or
/// invalid coordinates, or `ParseError::TooManyRecords` if the limit is exceeded.
pub fn parse_rrna_text(text: &str) -> Result<Vec<ExternalRnaRecord>, ParseError> {
    let mut records = Vec::new();

    for (i, line) in text.lines().enumerate() {
        if line.starts_with("##FASTA") {
            break;
        }
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.get(2).is_some_and(|kind| !kind.contains("rRNA")) {
            continue;
        }

        let line_num = i + 1;
        if fields.len() < 9 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has fewer than 9 fields"
            )));
        }
        let parse_coordinate = |s: &str| {
            s.trim().parse::<i64>().map_err(|_| {
                ParseError::InvalidFormat(format!("Invalid coordinate on line {line_num}: '{s}'"))
            })
        };
        let start = parse_coordinate(fields[3])?;
        let end = parse_coordinate(fields[4])?;
        if start < 1 || end < start {
            return Err(ParseError::InvalidFormat(format!(
                "Invalid range on line {line_num}: {start}-{end}"
            )));
        }

        let name = attribute(fields[8], "product")
            .or_else(|| attribute(fields[8], "Name"))
            .unwrap_or("rRNA");
        let mut prediction = ExternalRnaRecord::new(
            fields[0].trim(),
            NormalizedRecord::span(RecordKind::Rrna, start - 1, end - 1, Strand::parse(fields[6]))
                .with_name(name),
            fields[1].trim(),
        );
        if let Ok(score) = fields[5].trim().parse::<f64>() {
            prediction = prediction.with_score(score);
        }

        if check_record_limit(records.len()).is_some() {
            return Err(ParseError::TooManyRecords(records.len()));
        }
        records.push(prediction);
    }

    Ok(records)
}
