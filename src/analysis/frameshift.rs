//! Frameshift adjacency classifier.
//!
//! Two neighbouring proteins that both align to the same reference protein, each
//! covering a different part of it, are likely the two halves of one gene broken by
//! a frameshift. The classifier checks the geometry of every shared subject and then
//! weighs the evidence against any hit showing either protein is already full length.

use thiserror::Error;
use tracing::debug;

use crate::analysis::engine::Thresholds;
use crate::core::hit::{AlignmentHit, HitSource};
use crate::core::protein::{GenomicLocation, ProteinAnnotation};
use crate::core::types::{Molecule, Strand};
use crate::diagnostics::{DiagnosticsStore, Problem, ProblemKind};
use crate::utils::validation::is_hypothetical;

/// Why a pair was not classified
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PairSkip {
    #[error("{0} is not a protein")]
    NotProtein(String),

    #[error("{0} has no genomic location")]
    NoGenomicLocation(String),

    #[error("{0} and {1} are on different strands")]
    StrandMismatch(String, String),

    #[error("hit of {0} has coordinates outside its sequences")]
    MalformedHit(String),
}

/// Outcome of one classified pair
#[derive(Debug, Clone, PartialEq)]
pub struct FrameshiftVerdict {
    pub frameshift: bool,

    /// Shared-subject hit pairs whose geometry fits a single longer protein
    pub num_fit: usize,

    /// Gap between the two calls in codons, stop codon included
    pub space: i64,

    /// First non-hypothetical subject among the fitting pairs
    pub common_subject: Option<String>,

    pub report: String,
}

/// Gap between two genomic spans in codons, counting one stop codon
pub fn codon_space(left_to: i64, right_from: i64) -> i64 {
    ((right_from - left_to) as f64 / 3.0).round() as i64 + 1
}

/// Does a shared-subject pair of hits fit one protein split between `upstream` and
/// `downstream` (in protein orientation)?
pub fn hits_fit(upstream: &AlignmentHit, downstream: &AlignmentHit, space: i64) -> bool {
    let gap = upstream.query_tail_right() + space + downstream.query_tail_left();
    let right_room = (upstream.subject_tail_right() - downstream.subject_tail_right())
        - gap
        - downstream.query_middle();
    let left_room = (downstream.subject_tail_left() - upstream.subject_tail_left())
        - gap
        - upstream.query_middle();
    right_room > 0 && left_room > 0
}

/// A non-hypothetical hit leaving short tails on both query and subject
pub fn is_exonerating(hit: &AlignmentHit, query_tail_fraction: f64, subject_tail_fraction: f64) -> bool {
    let query_tails = (hit.query_tail_left() + hit.query_tail_right()) as f64;
    let subject_tails = (hit.subject_tail_left() + hit.subject_tail_right()) as f64;
    query_tails < query_tail_fraction * hit.query_len as f64
        && subject_tails < subject_tail_fraction * hit.subject_len as f64
        && !hit.is_hypothetical()
}

fn located(protein: &ProteinAnnotation) -> Result<&GenomicLocation, PairSkip> {
    if protein.molecule != Molecule::Protein {
        return Err(PairSkip::NotProtein(protein.id.clone()));
    }
    protein
        .location
        .as_ref()
        .filter(|l| !l.exons.is_empty())
        .ok_or_else(|| PairSkip::NoGenomicLocation(protein.id.clone()))
}

/// Classify two proteins adjacent on the genome, `left` first in genomic order.
pub fn classify(
    left: &ProteinAnnotation,
    right: &ProteinAnnotation,
    hits: &HitSource,
    thresholds: &Thresholds,
) -> Result<FrameshiftVerdict, PairSkip> {
    let left_loc = located(left)?;
    let right_loc = located(right)?;
    if left_loc.strand() != right_loc.strand() {
        return Err(PairSkip::StrandMismatch(left.id.clone(), right.id.clone()));
    }

    let left_hits = hits.get(&left.id);
    let right_hits = hits.get(&right.id);
    if left_hits.iter().any(|h| !h.is_well_formed()) {
        return Err(PairSkip::MalformedHit(left.id.clone()));
    }
    if right_hits.iter().any(|h| !h.is_well_formed()) {
        return Err(PairSkip::MalformedHit(right.id.clone()));
    }

    let space = codon_space(left_loc.to(), right_loc.from());

    // Protein orientation: on the minus strand the right-hand call is the N-terminal half
    let (upstream, downstream) = if left_loc.strand() == Strand::Minus {
        (right_hits, left_hits)
    } else {
        (left_hits, right_hits)
    };

    let mut num_fit = 0;
    let mut common_subject: Option<String> = None;
    for up in upstream {
        for down in downstream {
            if !up.shares_subject(down) || !hits_fit(up, down, space) {
                continue;
            }
            num_fit += 1;
            if common_subject.is_none() && !up.is_hypothetical() {
                common_subject = Some(up.subject.clone());
            }
        }
    }

    let frameshift = if num_fit == 0 {
        false
    } else if is_hypothetical(&left.description) || is_hypothetical(&right.description) {
        true
    } else if num_fit < 2 {
        false
    } else {
        !left_hits.iter().chain(right_hits).any(|h| {
            is_exonerating(
                h,
                thresholds.query_tail_fraction,
                thresholds.subject_tail_fraction,
            )
        })
    };

    let report = format!(
        "{} ({}..{}) and {} ({}..{}) on {}: {num_fit} shared hits fit a gap of {space} codons{}",
        left.id,
        left_loc.from(),
        left_loc.to(),
        right.id,
        right_loc.from(),
        right_loc.to(),
        left_loc.strand(),
        common_subject
            .as_deref()
            .map(|s| format!(", common subject {s}"))
            .unwrap_or_default()
    );
    debug!("Frameshift check {report}: {frameshift}");

    Ok(FrameshiftVerdict {
        frameshift,
        num_fit,
        space,
        common_subject,
        report,
    })
}

/// Record a positive verdict: the report goes on `left`, an empty companion on `right`.
///
/// Returns whether anything was recorded.
pub fn record_verdict(
    left: &ProteinAnnotation,
    right: &ProteinAnnotation,
    verdict: &FrameshiftVerdict,
    store: &mut DiagnosticsStore,
) -> bool {
    if !verdict.frameshift {
        return false;
    }
    let (Some(left_loc), Some(right_loc)) = (&left.location, &right.location) else {
        return false;
    };
    let (from, to) = (left_loc.from(), right_loc.to().max(left_loc.to()));
    let annotation = match &verdict.common_subject {
        Some(subject) => format!("possible frameshift, similar to {subject}"),
        None => "possible frameshift".to_string(),
    };
    store.record(
        left.id.clone(),
        Problem::new(ProblemKind::Frameshift, verdict.report.clone())
            .with_annotation(annotation)
            .at(from, to, left_loc.strand())
            .paired_with(right.id.clone()),
    );
    store.record(
        right.id.clone(),
        Problem::new(ProblemKind::Frameshift, "").paired_with(left.id.clone()),
    );
    true
}
