//! Per-protein checks: abnormally short proteins and truncated calls.

use crate::core::protein::{GenomicLocation, ProteinAnnotation};
use crate::diagnostics::{DiagnosticsStore, Problem, ProblemKind};

/// Does the location run off the left end of the sequence with a fuzzy boundary?
fn open_left_edge(location: &GenomicLocation) -> bool {
    !location.wraps_origin && location.from() == 0 && location.partial_left()
}

/// Does the location run off the right end of the sequence with a fuzzy boundary?
fn open_right_edge(location: &GenomicLocation, seq_length: i64) -> bool {
    !location.wraps_origin && location.to() == seq_length - 1 && location.partial_right()
}

/// Short proteins are expected where the sequence ends and the gene continues past it.
pub fn is_short_protein(protein: &ProteinAnnotation, seq_length: i64, min_length: i64) -> bool {
    if protein.length >= min_length {
        return false;
    }
    match &protein.location {
        Some(location) => !(open_left_edge(location) || open_right_edge(location, seq_length)),
        None => true,
    }
}

/// A fuzzy boundary away from the sequence ends: the call stops inside the contig.
pub fn is_truncated(location: &GenomicLocation, seq_length: i64) -> bool {
    if location.wraps_origin {
        return false;
    }
    (location.partial_left() && location.from() != 0)
        || (location.partial_right() && location.to() != seq_length - 1)
}

/// Run both checks on a protein of a sequence of `seq_length` bases.
///
/// Returns the number of problems recorded.
pub fn check_protein(
    protein: &ProteinAnnotation,
    seq_length: i64,
    min_length: i64,
    store: &mut DiagnosticsStore,
) -> usize {
    let mut found = 0;
    if is_short_protein(protein, seq_length, min_length) {
        let mut problem = Problem::new(
            ProblemKind::ShortProtein,
            format!(
                "{} is {} residues long (minimum {min_length})",
                protein.id, protein.length
            ),
        )
        .with_annotation(format!("short protein, {} residues", protein.length));
        if let Some(location) = &protein.location {
            problem = problem.at(location.from(), location.to(), location.strand());
        }
        store.record(protein.id.clone(), problem);
        found += 1;
    }

    if let Some(location) = protein.location.as_ref().filter(|l| is_truncated(l, seq_length)) {
        let side = match (location.partial_left(), location.partial_right()) {
            (true, true) => "both ends",
            (true, false) => "left end",
            _ => "right end",
        };
        store.record(
            protein.id.clone(),
            Problem::new(
                ProblemKind::Partial,
                format!(
                    "{} is partial at its {side} but lies inside {} ({}..{})",
                    protein.id,
                    location.seq_id,
                    location.from(),
                    location.to()
                ),
            )
            .with_annotation("partial gene away from a sequence end")
            .at(location.from(), location.to(), location.strand()),
        );
        found += 1;
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Strand;

    fn short(from: i64, to: i64, strand: Strand) -> ProteinAnnotation {
        ProteinAnnotation::new("p1", "hypothetical protein", 8)
            .at(GenomicLocation::span("contig1", from, to, strand))
    }

    #[test]
    fn test_short_protein_inside_sequence() {
        let protein = short(1000, 1026, Strand::Plus);
        let mut store = DiagnosticsStore::new();
        assert_eq!(check_protein(&protein, 5000, 30, &mut store), 1);
        let problem = &store.problems("p1")[0];
        assert_eq!(problem.kind, ProblemKind::ShortProtein);
        let span = problem.span.unwrap();
        assert_eq!((span.from, span.to), (1000, 1026));
    }

    #[test]
    fn test_short_protein_at_fuzzy_edge_is_exempt() {
        let mut protein = short(0, 26, Strand::Plus);
        if let Some(location) = protein.location.as_mut() {
            location.partial_start = true;
        }
        let mut store = DiagnosticsStore::new();
        assert_eq!(check_protein(&protein, 5000, 30, &mut store), 0);
        assert!(store.is_empty());

        // Minus strand: the 5' end is on the right
        let mut protein = short(4973, 4999, Strand::Minus);
        if let Some(location) = protein.location.as_mut() {
            location.partial_start = true;
        }
        assert!(!is_short_protein(&protein, 5000, 30));
    }

    #[test]
    fn test_edge_without_fuzzy_flag_is_not_exempt() {
        let protein = short(0, 26, Strand::Plus);
        assert!(is_short_protein(&protein, 5000, 30));
    }

    #[test]
    fn test_truncated_inside_contig() {
        let mut location = GenomicLocation::span("contig1", 1000, 1899, Strand::Plus);
        location.partial_stop = true;
        assert!(is_truncated(&location, 5000));

        let protein = ProteinAnnotation::new("p2", "ABC transporter", 300).at(location);
        let mut store = DiagnosticsStore::new();
        assert_eq!(check_protein(&protein, 5000, 30, &mut store), 1);
        assert!(store.has("p2", ProblemKind::Partial.into()));
    }

    #[test]
    fn test_partial_at_edge_is_fine() {
        let mut location = GenomicLocation::span("contig1", 4100, 4999, Strand::Plus);
        location.partial_stop = true;
        assert!(!is_truncated(&location, 5000));
        location.wraps_origin = true;
        location.partial_start = true;
        assert!(!is_truncated(&location, 5000));
    }
}
