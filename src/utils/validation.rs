//! Centralized validation and helper functions.

/// Maximum number of records accepted from a single input table (DOS protection)
pub const MAX_RECORDS: usize = 5_000_000;

/// Markers of a low-confidence product description
const HYPOTHETICAL_MARKERS: &[&str] = &["hypothetical", "uncharacterized"];

/// Check whether a product description marks a low-confidence annotation.
///
/// # Examples
///
/// ```
/// use annot_qc::utils::validation::is_hypothetical;
///
/// assert!(is_hypothetical("hypothetical protein"));
/// assert!(is_hypothetical("Uncharacterized protein YbaB"));
/// assert!(!is_hypothetical("DNA gyrase subunit A"));
/// ```
#[must_use]
pub fn is_hypothetical(description: &str) -> bool {
    let lower = description.to_lowercase();
    HYPOTHETICAL_MARKERS.iter().any(|m| lower.contains(m))
}

/// Strip the contig prefix from a record identity.
///
/// Identities have the form `"<seq-id>|<name>"`; the name is the part after the
/// last `|`. Identities without a prefix are returned unchanged.
///
/// ```
/// use annot_qc::utils::validation::strip_contig_prefix;
///
/// assert_eq!(strip_contig_prefix("lcl|contig1|ABC_0001"), "ABC_0001");
/// assert_eq!(strip_contig_prefix("ABC_0001"), "ABC_0001");
/// ```
#[must_use]
pub fn strip_contig_prefix(identity: &str) -> &str {
    identity
        .rsplit_once('|')
        .map_or(identity, |(_, name)| name)
}

/// Check if adding another record would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new record.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_record_limit(count: usize) -> Option<String> {
    if count >= MAX_RECORDS {
        Some(format!(
            "Too many records: adding another would exceed maximum of {MAX_RECORDS}"
        ))
    } else {
        None
    }
}

/// Validate a 1-based closed coordinate range against a sequence length
#[must_use]
pub fn is_valid_range(from: i64, to: i64, length: i64) -> bool {
    from >= 1 && from <= to && to <= length
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_hypothetical_case_insensitive() {
        assert!(is_hypothetical("HYPOTHETICAL PROTEIN"));
        assert!(is_hypothetical("conserved hypothetical protein"));
        assert!(!is_hypothetical(""));
    }

    #[test]
    fn test_check_record_limit() {
        assert!(check_record_limit(0).is_none());
        assert!(check_record_limit(MAX_RECORDS - 1).is_none());
        assert!(check_record_limit(MAX_RECORDS).is_some());
    }

    #[test]
    fn test_is_valid_range() {
        assert!(is_valid_range(1, 50, 50));
        assert!(!is_valid_range(0, 50, 50));
        assert!(!is_valid_range(10, 5, 50));
        assert!(!is_valid_range(1, 51, 50));
    }
}
