//! Overlap decisions between proteins, and between RNAs and proteins.

use tracing::debug;

use crate::analysis::overlap::{complete_overlap, find_overlap, overlap, Spanned, WindowCursor};
use crate::core::protein::ProteinAnnotation;
use crate::core::record::{Exon, NormalizedRecord};
use crate::core::types::{RecordKind, Strand, TrnaStatus};
use crate::diagnostics::{DiagnosticsStore, Problem, ProblemKind};
use crate::utils::validation::is_hypothetical;

impl Spanned for ProteinAnnotation {
    fn exons(&self) -> &[Exon] {
        match &self.location {
            Some(location) => &location.exons,
            None => &[],
        }
    }
}

/// Which record of an RNA/CDS collision should go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalTarget {
    Rna,
    Cds,
    Neither,
}

/// Removal policy for an RNA overlapping a CDS
pub fn rna_overlap_policy(rna: &RecordKind, cds_hypothetical: bool) -> RemovalTarget {
    match (rna, cds_hypothetical) {
        (
            RecordKind::Trna {
                status: TrnaStatus::Pseudo | TrnaStatus::Atypical,
                ..
            },
            false,
        ) => RemovalTarget::Rna,
        (
            RecordKind::Trna {
                status: TrnaStatus::Normal | TrnaStatus::Atypical,
                ..
            }
            | RecordKind::Rrna,
            true,
        ) => RemovalTarget::Cds,
        _ => RemovalTarget::Neither,
    }
}

/// Shared region of two spans, for positioning a problem
fn shared_span(a: &[Exon], b: &[Exon]) -> (i64, i64) {
    let a_from = a.iter().map(|e| e.from).min().unwrap_or_default();
    let a_to = a.iter().map(|e| e.to).max().unwrap_or_default();
    let b_from = b.iter().map(|e| e.from).min().unwrap_or_default();
    let b_to = b.iter().map(|e| e.to).max().unwrap_or_default();
    (a_from.max(b_from), a_to.min(b_to))
}

fn strand_of(exons: &[Exon]) -> Strand {
    exons.first().map_or(Strand::Unknown, |e| e.strand)
}

/// Flag pairs of proteins whose genomic spans share at least `threshold` bases.
///
/// `proteins` must be sorted by genomic start and located on one sequence; proteins
/// without a location are ignored. Returns the number of overlapping pairs.
pub fn check_cds_overlaps(
    proteins: &[ProteinAnnotation],
    threshold: i64,
    store: &mut DiagnosticsStore,
) -> usize {
    let mut pairs = 0;
    for (i, a) in proteins.iter().enumerate() {
        if a.exons().is_empty() {
            continue;
        }
        let a_to = a.span_to();
        for b in &proteins[i + 1..] {
            if b.exons().is_empty() {
                continue;
            }
            if b.span_from() > a_to {
                break;
            }
            let shared = overlap(a.exons(), b.exons());
            if shared < threshold {
                continue;
            }
            pairs += 1;
            record_cds_overlap(a, b, shared, store);
        }
    }
    pairs
}

fn record_cds_overlap(
    a: &ProteinAnnotation,
    b: &ProteinAnnotation,
    shared: i64,
    store: &mut DiagnosticsStore,
) {
    let (from, to) = shared_span(a.exons(), b.exons());
    let contained = if complete_overlap(a.exons(), b.exons()) {
        Some((a, b))
    } else if complete_overlap(b.exons(), a.exons()) {
        Some((b, a))
    } else {
        None
    };

    match contained {
        Some((inner, outer)) if is_hypothetical(&inner.description) => {
            debug!("{} is a hypothetical protein inside {}", inner.id, outer.id);
            store.record(
                inner.id.clone(),
                Problem::new(
                    ProblemKind::RemoveOverlap,
                    format!(
                        "hypothetical {} lies entirely within {} ({})",
                        inner.id, outer.id, outer.description
                    ),
                )
                .paired_with(outer.id.clone()),
            );
            for (this, other) in [(inner, outer), (outer, inner)] {
                store.record(
                    this.id.clone(),
                    Problem::new(
                        ProblemKind::CompleteOverlap,
                        format!("{} and {} share {shared} bp, one inside the other", this.id, other.id),
                    )
                    .with_annotation(format!("CDS completely overlaps {}", other.id))
                    .at(from, to, strand_of(this.exons()))
                    .paired_with(other.id.clone()),
                );
            }
        }
        _ => {
            for (this, other) in [(a, b), (b, a)] {
                store.record(
                    this.id.clone(),
                    Problem::new(
                        ProblemKind::Overlap,
                        format!("{} overlaps {} by {shared} bp", this.id, other.id),
                    )
                    .with_annotation(format!("CDS overlaps {}", other.id))
                    .at(from, to, strand_of(this.exons()))
                    .paired_with(other.id.clone()),
                );
            }
        }
    }
}

/// Flag RNAs whose span shares at least `threshold` bases with a protein.
///
/// Both lists must be sorted ascending (`rnas` by key, `proteins` by genomic start)
/// and belong to one sequence. mRNAs are skipped. Returns the number of collisions.
pub fn check_rna_overlaps(
    rnas: &[NormalizedRecord],
    proteins: &[ProteinAnnotation],
    threshold: i64,
    store: &mut DiagnosticsStore,
) -> usize {
    let mut collisions = 0;
    let mut cursor = WindowCursor::new();
    for rna in rnas {
        if !rna.kind.is_rna() || rna.kind == RecordKind::Mrna {
            continue;
        }
        for idx in find_overlap(proteins, &mut cursor, &rna.exons) {
            let cds = &proteins[idx];
            let shared = overlap(&rna.exons, cds.exons());
            if shared < threshold {
                continue;
            }
            collisions += 1;

            let rna_id = rna.identity();
            let (from, to) = shared_span(&rna.exons, cds.exons());
            store.record(
                rna_id.clone(),
                Problem::new(
                    ProblemKind::RnaOverlap,
                    format!("{} overlaps CDS {} by {shared} bp", rna.name, cds.id),
                )
                .with_annotation(format!("{} overlaps CDS {}", rna.name, cds.id))
                .at(from, to, rna.strand())
                .paired_with(cds.id.clone()),
            );
            store.record(
                cds.id.clone(),
                Problem::new(
                    ProblemKind::RnaOverlap,
                    format!("{} overlaps {} {} by {shared} bp", cds.id, rna.name, rna_id),
                )
                .with_annotation(format!("CDS overlaps {}", rna.name))
                .at(from, to, strand_of(cds.exons()))
                .paired_with(rna_id.clone()),
            );

            let cds_hypothetical = is_hypothetical(&cds.description);
            match rna_overlap_policy(&rna.kind, cds_hypothetical) {
                RemovalTarget::Rna => store.record(
                    rna_id.clone(),
                    Problem::new(
                        ProblemKind::RemoveOverlap,
                        format!("{} overlaps confident CDS {}", rna.name, cds.id),
                    )
                    .paired_with(cds.id.clone()),
                ),
                RemovalTarget::Cds => store.record(
                    cds.id.clone(),
                    Problem::new(
                        ProblemKind::RemoveOverlap,
                        format!("hypothetical {} overlaps {}", cds.id, rna.name),
                    )
                    .paired_with(rna_id.clone()),
                ),
                RemovalTarget::Neither => {}
            }
        }
    }
    collisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::protein::GenomicLocation;
    use crate::core::types::AminoAcid;
    use crate::diagnostics::ProblemMask;

    fn protein(id: &str, description: &str, from: i64, to: i64) -> ProteinAnnotation {
        ProteinAnnotation::new(id, description, (to - from + 1) / 3)
            .at(GenomicLocation::span("contig1", from, to, Strand::Plus))
    }

    fn trna(status: TrnaStatus, from: i64, to: i64) -> NormalizedRecord {
        NormalizedRecord::span(
            RecordKind::Trna {
                amino_acid: Some(AminoAcid::Ala),
                status,
            },
            from,
            to,
            Strand::Plus,
        )
        .with_name("tRNA-Ala")
        .with_locus_tag("T_9")
    }

    #[test]
    fn test_policy_table() {
        let normal = RecordKind::Trna { amino_acid: None, status: TrnaStatus::Normal };
        let atypical = RecordKind::Trna { amino_acid: None, status: TrnaStatus::Atypical };
        let pseudo = RecordKind::Trna { amino_acid: None, status: TrnaStatus::Pseudo };

        assert_eq!(rna_overlap_policy(&pseudo, false), RemovalTarget::Rna);
        assert_eq!(rna_overlap_policy(&atypical, false), RemovalTarget::Rna);
        assert_eq!(rna_overlap_policy(&normal, true), RemovalTarget::Cds);
        assert_eq!(rna_overlap_policy(&atypical, true), RemovalTarget::Cds);
        assert_eq!(rna_overlap_policy(&RecordKind::Rrna, true), RemovalTarget::Cds);
        assert_eq!(rna_overlap_policy(&normal, false), RemovalTarget::Neither);
        assert_eq!(rna_overlap_policy(&pseudo, true), RemovalTarget::Neither);
        assert_eq!(rna_overlap_policy(&RecordKind::Rrna, false), RemovalTarget::Neither);
        assert_eq!(rna_overlap_policy(&RecordKind::OtherRna, true), RemovalTarget::Neither);
    }

    #[test]
    fn test_cds_partial_overlap() {
        let proteins = vec![
            protein("p1", "DNA gyrase", 100, 600),
            protein("p2", "hypothetical protein", 560, 900),
        ];
        let mut store = DiagnosticsStore::new();
        assert_eq!(check_cds_overlaps(&proteins, 30, &mut store), 1);
        assert!(store.has("p1", ProblemKind::Overlap.into()));
        assert!(store.has("p2", ProblemKind::Overlap.into()));
        assert!(!store.has("p2", ProblemMask::REMOVAL));
        let span = store.problems("p1")[0].span.unwrap();
        assert_eq!((span.from, span.to), (560, 600));
    }

    #[test]
    fn test_cds_below_threshold() {
        let proteins = vec![
            protein("p1", "DNA gyrase", 100, 600),
            protein("p2", "hypothetical protein", 590, 900),
        ];
        let mut store = DiagnosticsStore::new();
        assert_eq!(check_cds_overlaps(&proteins, 30, &mut store), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_contained_hypothetical_is_removal_candidate() {
        let proteins = vec![
            protein("outer", "RNA polymerase beta", 100, 3000),
            protein("inner", "hypothetical protein", 400, 700),
        ];
        let mut store = DiagnosticsStore::new();
        check_cds_overlaps(&proteins, 30, &mut store);
        assert!(store.has("inner", ProblemKind::RemoveOverlap.into()));
        assert!(store.has("inner", ProblemKind::CompleteOverlap.into()));
        assert!(store.has("outer", ProblemKind::CompleteOverlap.into()));
        assert!(!store.has("outer", ProblemKind::RemoveOverlap.into()));
    }

    #[test]
    fn test_contained_confident_is_plain_overlap() {
        let proteins = vec![
            protein("outer", "RNA polymerase beta", 100, 3000),
            protein("inner", "transposase", 400, 700),
        ];
        let mut store = DiagnosticsStore::new();
        check_cds_overlaps(&proteins, 30, &mut store);
        assert!(store.has("inner", ProblemKind::Overlap.into()));
        assert!(store.collect_removal_candidates().is_empty());
    }

    #[test]
    fn test_rna_overlap_removes_hypothetical_cds() {
        let proteins = vec![protein("cds1", "hypothetical protein", 1000, 2000)];
        let rnas = vec![trna(TrnaStatus::Normal, 1950, 2100)];
        let mut store = DiagnosticsStore::new();
        assert_eq!(check_rna_overlaps(&rnas, &proteins, 30, &mut store), 1);
        assert!(store.has("T_9", ProblemKind::RnaOverlap.into()));
        assert!(store.has("cds1", ProblemKind::RnaOverlap.into()));
        assert!(store.has("cds1", ProblemKind::RemoveOverlap.into()));
        assert!(!store.has("T_9", ProblemKind::RemoveOverlap.into()));
    }

    #[test]
    fn test_pseudo_trna_over_confident_cds_is_removed() {
        let proteins = vec![protein("cds1", "elongation factor Tu", 1000, 2000)];
        let rnas = vec![trna(TrnaStatus::Pseudo, 1950, 2100)];
        let mut store = DiagnosticsStore::new();
        check_rna_overlaps(&rnas, &proteins, 30, &mut store);
        assert!(store.has("T_9", ProblemKind::RemoveOverlap.into()));
        assert!(!store.has("cds1", ProblemKind::RemoveOverlap.into()));
    }
}
