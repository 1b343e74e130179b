//! Reconciliation of annotated RNAs with external RNA predictions.
//!
//! Two passes share the sorted-window technique of [`crate::analysis::overlap`]:
//! [`match_na`] looks up every annotated tRNA among the predictions of the same
//! amino acid, and [`simple_overlaps`] walks the prediction table looking for
//! predictions the annotation is missing or has on the wrong strand.

use std::cmp::Ordering;
use tracing::debug;

use crate::analysis::overlap::{
    context_distance, find_overlap, neighboring_records, overlap, proximity, WindowCursor,
};
use crate::core::record::{ExternalRnaRecord, NormalizedRecord};
use crate::diagnostics::{DiagnosticsStore, Problem, ProblemKind};

/// Outcome of looking up one annotated tRNA among the predictions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrnaMatch {
    /// No prediction of the same amino acid
    Missing,
    /// Same-type predictions exist, none on the annotated strand
    BadStrand,
    /// Same type and strand, but no shared base
    CompleteMismatch,
    /// Best candidate overlaps with shifted boundaries (annotated minus predicted)
    Mismatch {
        index: usize,
        left_shift: i64,
        right_shift: i64,
    },
    /// Best candidate has identical boundaries
    Exact { index: usize },
}

impl TrnaMatch {
    pub fn problem_kind(self) -> Option<ProblemKind> {
        match self {
            Self::Missing => Some(ProblemKind::TrnaMissing),
            Self::BadStrand => Some(ProblemKind::TrnaBadStrand),
            Self::CompleteMismatch => Some(ProblemKind::TrnaCompleteMismatch),
            Self::Mismatch { .. } => Some(ProblemKind::TrnaMismatch),
            Self::Exact { .. } => None,
        }
    }

    /// Index of the matched prediction, if any
    pub fn matched(self) -> Option<usize> {
        match self {
            Self::Mismatch { index, .. } | Self::Exact { index } => Some(index),
            _ => None,
        }
    }
}

/// Find the prediction best matching an annotated tRNA.
///
/// Candidates share the amino acid and the strand and overlap the annotation; the
/// best one minimises `|left_shift| + |right_shift|`, first seen on ties.
pub fn match_trna(annotated: &NormalizedRecord, predictions: &[ExternalRnaRecord]) -> TrnaMatch {
    let amino_acid = annotated.kind.amino_acid();
    let mut same_type = false;
    let mut same_strand = false;
    let mut best: Option<(i64, usize, i64, i64)> = None;

    for (i, prediction) in predictions.iter().enumerate() {
        if !prediction.record.kind.is_trna() || prediction.record.kind.amino_acid() != amino_acid {
            continue;
        }
        same_type = true;
        if prediction.record.strand() != annotated.strand() {
            continue;
        }
        same_strand = true;
        if overlap(&annotated.exons, &prediction.record.exons) == 0 {
            continue;
        }
        let left_shift = annotated.from() - prediction.record.from();
        let right_shift = annotated.to() - prediction.record.to();
        let total = left_shift.abs() + right_shift.abs();
        if best.map_or(true, |(best_total, ..)| total < best_total) {
            best = Some((total, i, left_shift, right_shift));
        }
    }

    match best {
        _ if !same_type => TrnaMatch::Missing,
        _ if !same_strand => TrnaMatch::BadStrand,
        None => TrnaMatch::CompleteMismatch,
        Some((0, index, ..)) => TrnaMatch::Exact { index },
        Some((_, index, left_shift, right_shift)) => TrnaMatch::Mismatch {
            index,
            left_shift,
            right_shift,
        },
    }
}

/// Look up every annotated tRNA with an amino acid among `predictions` (all on the
/// same sequence as `annotated`). Matched predictions are marked `present`.
///
/// Returns the number of tRNAs with a problem.
pub fn match_na(
    annotated: &[NormalizedRecord],
    predictions: &mut [ExternalRnaRecord],
    store: &mut DiagnosticsStore,
) -> usize {
    let mut flagged = 0;
    for trna in annotated.iter().filter(|r| r.kind.is_trna()) {
        let Some(amino_acid) = trna.kind.amino_acid() else {
            debug!("Skipping tRNA {} without amino acid", trna.display_identity());
            continue;
        };
        let outcome = match_trna(trna, predictions);
        if let Some(index) = outcome.matched() {
            predictions[index].present = true;
        }
        let Some(kind) = outcome.problem_kind() else {
            continue;
        };

        flagged += 1;
        let report = match outcome {
            TrnaMatch::Missing => format!("no {amino_acid} tRNA predicted on this sequence"),
            TrnaMatch::BadStrand => {
                format!("{amino_acid} tRNA predicted only on the opposite strand")
            }
            TrnaMatch::CompleteMismatch => {
                format!("no {amino_acid} tRNA prediction overlaps the annotation")
            }
            TrnaMatch::Mismatch {
                index,
                left_shift,
                right_shift,
            } => format!(
                "boundaries differ from {} by {left_shift}/{right_shift}",
                predictions[index].label()
            ),
            TrnaMatch::Exact { .. } => String::new(),
        };
        store.record(
            trna.identity(),
            Problem::new(kind, report)
                .with_annotation(format!("{} {}", trna.name, kind.label()))
                .at(trna.from(), trna.to(), trna.strand()),
        );
    }
    flagged
}

/// Context-window text: predictions and annotated RNAs near a flagged prediction.
///
/// The cursors move with the widest radius any prediction can have (`window_cap`),
/// so a narrow window never skips records a later, wider one still needs; results
/// are then narrowed to `max_distance`.
fn context_report(
    focus: usize,
    predictions: &[ExternalRnaRecord],
    annotated: &[NormalizedRecord],
    prediction_cursor: &mut WindowCursor,
    annotated_cursor: &mut WindowCursor,
    max_distance: i64,
    window_cap: i64,
) -> String {
    let target = &predictions[focus].record;
    let (from, to) = (target.from(), target.to());
    let within = |r: &NormalizedRecord| {
        proximity(from, to, r.from(), r.to(), max_distance) == Ordering::Equal
    };

    let nearby_predictions: Vec<String> =
        neighboring_records(predictions, prediction_cursor, from, to, window_cap)
            .into_iter()
            .filter(|&i| i != focus && within(&predictions[i].record))
            .map(|i| predictions[i].label())
            .collect();
    let nearby_annotated: Vec<String> =
        neighboring_records(annotated, annotated_cursor, from, to, window_cap)
            .into_iter()
            .map(|i| &annotated[i])
            .filter(|r| within(*r))
            .map(|r| format!("{} {}-{}({})", r.name, r.from(), r.to(), r.strand()))
            .collect();

    let list = |items: &[String]| {
        if items.is_empty() {
            "none".to_string()
        } else {
            items.join(", ")
        }
    };
    format!(
        "within {max_distance} bp: predicted [{}]; annotated [{}]",
        list(&nearby_predictions),
        list(&nearby_annotated)
    )
}

/// Walk the predictions of one sequence against its annotated RNAs.
///
/// Both lists must be sorted ascending by `key`. A prediction overlapped by an
/// annotation of the same class on its strand is marked `present`. Predictions with
/// no overlapping annotation of the same class are recorded as `RNA-absent` under
/// `seq_id`; overlapping annotations of the same class on another strand are
/// recorded under the annotation. Returns the number of absent predictions.
pub fn simple_overlaps(
    seq_id: &str,
    predictions: &mut [ExternalRnaRecord],
    annotated: &[NormalizedRecord],
    span_factor: i64,
    max_context: i64,
    store: &mut DiagnosticsStore,
) -> usize {
    let mut absent = 0;
    let mut overlap_cursor = WindowCursor::new();
    let mut prediction_cursor = WindowCursor::new();
    let mut annotated_cursor = WindowCursor::new();

    for i in 0..predictions.len() {
        let candidates: Vec<&NormalizedRecord> =
            find_overlap(annotated, &mut overlap_cursor, &predictions[i].record.exons)
                .into_iter()
                .map(|j| &annotated[j])
                .filter(|r| r.kind.same_rna_class(&predictions[i].record.kind))
                .collect();

        if candidates
            .iter()
            .any(|r| r.strand() == predictions[i].record.strand())
        {
            predictions[i].present = true;
            continue;
        }

        let prediction = &predictions[i];
        let target = &prediction.record;
        let max_distance = context_distance(target.span_len(), span_factor, max_context);
        let context = context_report(
            i,
            predictions,
            annotated,
            &mut prediction_cursor,
            &mut annotated_cursor,
            max_distance,
            max_context,
        );

        if candidates.is_empty() {
            absent += 1;
            store.record(
                seq_id.to_string(),
                Problem::new(
                    ProblemKind::RnaAbsent,
                    format!("{} is not annotated; {context}", prediction.label()),
                )
                .with_annotation(format!(
                    "{} predicted by {} is not annotated",
                    target.name, prediction.method
                ))
                .at(target.from(), target.to(), target.strand()),
            );
            continue;
        }

        let (kind, annotation) = match candidates.iter().find(|r| r.strand().is_unknown()) {
            Some(undefined) => (ProblemKind::RnaUndefStrand, *undefined),
            None => (ProblemKind::RnaBadStrand, candidates[0]),
        };
        store.record(
            annotation.identity(),
            Problem::new(
                kind,
                format!(
                    "{} annotated on strand {} but predicted as {}; {context}",
                    annotation.name,
                    annotation.strand(),
                    prediction.label()
                ),
            )
            .with_annotation(format!("{} {}", annotation.name, kind.label()))
            .at(annotation.from(), annotation.to(), annotation.strand()),
        );
    }
    absent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AminoAcid, RecordKind, Strand, TrnaStatus};

    fn trna_kind(aa: AminoAcid) -> RecordKind {
        RecordKind::Trna {
            amino_acid: Some(aa),
            status: TrnaStatus::Normal,
        }
    }

    fn annotated_trna(aa: AminoAcid, from: i64, to: i64, strand: Strand) -> NormalizedRecord {
        NormalizedRecord::span(trna_kind(aa), from, to, strand).with_name(format!("tRNA-{aa}"))
    }

    fn predicted(kind: RecordKind, from: i64, to: i64, strand: Strand) -> ExternalRnaRecord {
        ExternalRnaRecord::new(
            "contig1",
            NormalizedRecord::span(kind, from, to, strand).with_name(kind.label()),
            "tRNAscan-SE",
        )
    }

    #[test]
    fn test_bad_strand_and_missing() {
        let trna = annotated_trna(AminoAcid::Ala, 500, 572, Strand::Plus);
        let predictions = vec![predicted(trna_kind(AminoAcid::Ala), 505, 570, Strand::Minus)];
        assert_eq!(match_trna(&trna, &predictions), TrnaMatch::BadStrand);
        assert_eq!(match_trna(&trna, &[]), TrnaMatch::Missing);

        let other_type = vec![predicted(trna_kind(AminoAcid::Gly), 500, 572, Strand::Plus)];
        assert_eq!(match_trna(&trna, &other_type), TrnaMatch::Missing);
    }

    #[test]
    fn test_complete_mismatch() {
        let trna = annotated_trna(AminoAcid::Ala, 500, 572, Strand::Plus);
        let predictions = vec![predicted(trna_kind(AminoAcid::Ala), 2000, 2072, Strand::Plus)];
        assert_eq!(match_trna(&trna, &predictions), TrnaMatch::CompleteMismatch);
    }

    #[test]
    fn test_best_candidate_minimises_shift() {
        let trna = annotated_trna(AminoAcid::Ala, 500, 572, Strand::Plus);
        let predictions = vec![
            predicted(trna_kind(AminoAcid::Ala), 480, 560, Strand::Plus),
            predicted(trna_kind(AminoAcid::Ala), 505, 570, Strand::Plus),
        ];
        assert_eq!(
            match_trna(&trna, &predictions),
            TrnaMatch::Mismatch {
                index: 1,
                left_shift: -5,
                right_shift: 2
            }
        );

        let exact = vec![predicted(trna_kind(AminoAcid::Ala), 500, 572, Strand::Plus)];
        assert_eq!(match_trna(&trna, &exact), TrnaMatch::Exact { index: 0 });
    }

    #[test]
    fn test_match_na_records_and_marks_present() {
        let annotated = vec![
            annotated_trna(AminoAcid::Ala, 500, 572, Strand::Plus).with_locus_tag("T_1"),
            annotated_trna(AminoAcid::Gly, 900, 972, Strand::Plus).with_locus_tag("T_2"),
        ];
        let mut predictions = vec![predicted(trna_kind(AminoAcid::Ala), 500, 572, Strand::Plus)];
        let mut store = DiagnosticsStore::new();

        assert_eq!(match_na(&annotated, &mut predictions, &mut store), 1);
        assert!(predictions[0].present);
        assert!(!store.has("T_1", ProblemKind::TrnaMissing.into()));
        assert!(store.has("T_2", ProblemKind::TrnaMissing.into()));
    }

    #[test]
    fn test_simple_overlaps_absent_and_bad_strand() {
        let annotated = vec![
            annotated_trna(AminoAcid::Ala, 500, 572, Strand::Minus).with_locus_tag("T_1"),
            NormalizedRecord::span(RecordKind::Rrna, 3000, 4500, Strand::Plus).with_locus_tag("T_2"),
        ];
        let mut predictions = vec![
            predicted(trna_kind(AminoAcid::Ala), 505, 570, Strand::Plus),
            predicted(trna_kind(AminoAcid::Leu), 1200, 1285, Strand::Plus),
            predicted(RecordKind::Rrna, 3000, 4500, Strand::Plus),
        ];
        let mut store = DiagnosticsStore::new();
        let absent = simple_overlaps("contig1", &mut predictions, &annotated, 10, 5000, &mut store);

        assert_eq!(absent, 1);
        assert!(store.has("T_1", ProblemKind::RnaBadStrand.into()));
        assert!(store.has("contig1", ProblemKind::RnaAbsent.into()));
        assert!(!store.has("T_2", crate::diagnostics::ProblemMask::RNA));
        assert!(!predictions[0].present);
        assert!(predictions[2].present);

        // The absent Leu prediction spans 86 bp, so its context radius is 860 bp
        let report = &store.problems("contig1")[0].report;
        assert!(report.contains("within 860 bp"));
        assert!(report.contains("tRNA contig1:505-570(+)"));
        assert!(report.contains("tRNA-Ala 500-572(-)"));
    }

    #[test]
    fn test_simple_overlaps_undefined_strand() {
        let annotated = vec![annotated_trna(AminoAcid::Ala, 500, 572, Strand::Unknown).with_locus_tag("T_1")];
        let mut predictions = vec![predicted(trna_kind(AminoAcid::Ala), 505, 570, Strand::Plus)];
        let mut store = DiagnosticsStore::new();
        assert_eq!(simple_overlaps("contig1", &mut predictions, &annotated, 10, 5000, &mut store), 0);
        assert!(store.has("T_1", ProblemKind::RnaUndefStrand.into()));
    }

    #[test]
    fn test_context_window_keeps_records_for_wider_radius() {
        // The Leu prediction's 730 bp radius must not push the annotated cursor past
        // tRNA-Ala before the rRNA prediction, whose radius is capped at 5000 bp.
        let annotated = vec![annotated_trna(AminoAcid::Ala, 8000, 8072, Strand::Plus)];
        let mut predictions = vec![
            predicted(trna_kind(AminoAcid::Leu), 10000, 10072, Strand::Plus),
            predicted(RecordKind::Rrna, 10100, 11600, Strand::Plus),
        ];
        let mut store = DiagnosticsStore::new();
        assert_eq!(simple_overlaps("contig1", &mut predictions, &annotated, 10, 5000, &mut store), 2);

        let problems = store.problems("contig1");
        assert!(problems[0].report.contains("within 730 bp"));
        assert!(problems[0].report.contains("annotated [none]"));
        assert!(problems[1].report.contains("within 5000 bp"));
        assert!(problems[1].report.contains("tRNA-Ala 8000-8072(+)"));
    }

    #[test]
    fn test_class_mismatch_counts_as_absent() {
        let annotated = vec![NormalizedRecord::span(RecordKind::Rrna, 400, 700, Strand::Plus)];
        let mut predictions = vec![predicted(trna_kind(AminoAcid::Ala), 505, 570, Strand::Plus)];
        let mut store = DiagnosticsStore::new();
        assert_eq!(simple_overlaps("contig1", &mut predictions, &annotated, 10, 5000, &mut store), 1);
    }
}
