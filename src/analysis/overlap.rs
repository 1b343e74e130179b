//! Interval overlap, containment and windowed search over sorted record lists.
//!
//! The windowed searches take a [`WindowCursor`] owned by the caller. The cursor only
//! moves forward: a caller walking a second sorted list in ascending order keeps one
//! cursor per searched list for the whole walk, which turns the nested scan into a
//! two-pointer sweep.

use std::cmp::Ordering;

use crate::core::protein::GenomicLocation;
use crate::core::record::{Exon, ExternalRnaRecord, NormalizedRecord};

/// Something with exons on a nucleotide sequence
pub trait Spanned {
    fn exons(&self) -> &[Exon];

    /// Leftmost coordinate
    fn span_from(&self) -> i64 {
        self.exons().iter().map(|e| e.from).min().unwrap_or_default()
    }

    /// Rightmost coordinate
    fn span_to(&self) -> i64 {
        self.exons().iter().map(|e| e.to).max().unwrap_or_default()
    }
}

impl Spanned for NormalizedRecord {
    fn exons(&self) -> &[Exon] {
        &self.exons
    }

    fn span_from(&self) -> i64 {
        self.key
    }
}

impl Spanned for ExternalRnaRecord {
    fn exons(&self) -> &[Exon] {
        &self.record.exons
    }

    fn span_from(&self) -> i64 {
        self.record.key
    }
}

impl Spanned for GenomicLocation {
    fn exons(&self) -> &[Exon] {
        &self.exons
    }
}

/// Number of bases shared by two exon sets, summed over all exon pairs
pub fn overlap(a: &[Exon], b: &[Exon]) -> i64 {
    a.iter()
        .flat_map(|x| b.iter().map(move |y| (x, y)))
        .map(|(x, y)| (x.to.min(y.to) - x.from.max(y.from) + 1).max(0))
        .sum()
}

/// Is every exon of `inner` fully inside some exon of `outer`?
pub fn complete_overlap(inner: &[Exon], outer: &[Exon]) -> bool {
    if inner.is_empty() {
        return false;
    }
    inner.iter().all(|i| {
        outer
            .iter()
            .any(|o| o.from <= i.from && i.to <= o.to)
    })
}

/// Position of `[from, to]` relative to the target widened by `max_distance`.
///
/// `Less` when the candidate ends before the window, `Greater` when it starts after
/// it, `Equal` when it reaches into it.
pub fn proximity(
    target_from: i64,
    target_to: i64,
    from: i64,
    to: i64,
    max_distance: i64,
) -> Ordering {
    if to < target_from - max_distance {
        Ordering::Less
    } else if from > target_to + max_distance {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Radius of the context window around a flagged record of `span` bases
pub fn context_distance(span: i64, factor: i64, cap: i64) -> i64 {
    (span.saturating_mul(factor)).clamp(0, cap.max(0))
}

/// Forward-only position in a sorted list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCursor {
    /// First index that may still be inside a window
    pub start: usize,
}

impl WindowCursor {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Indices of the records of `sorted` (ascending by `span_from`) whose exons share
/// at least one base with `exons`.
///
/// Records ending before the query are skipped for good; the scan stops at the first
/// record starting after the query.
pub fn find_overlap<T: Spanned>(sorted: &[T], cursor: &mut WindowCursor, exons: &[Exon]) -> Vec<usize> {
    let (Some(from), Some(to)) = (
        exons.iter().map(|e| e.from).min(),
        exons.iter().map(|e| e.to).max(),
    ) else {
        return Vec::new();
    };

    while cursor.start < sorted.len()
        && proximity(
            from,
            to,
            sorted[cursor.start].span_from(),
            sorted[cursor.start].span_to(),
            0,
        ) == Ordering::Less
    {
        cursor.start += 1;
    }

    let mut found = Vec::new();
    for (i, candidate) in sorted.iter().enumerate().skip(cursor.start) {
        if candidate.span_from() > to {
            break;
        }
        if overlap(candidate.exons(), exons) > 0 {
            found.push(i);
        }
    }
    found
}

/// Indices of the records of `sorted` within `max_distance` of `[from, to]`.
///
/// Advances the cursor past records that end before the window; never rewinds it.
pub fn neighboring_records<T: Spanned>(
    sorted: &[T],
    cursor: &mut WindowCursor,
    from: i64,
    to: i64,
    max_distance: i64,
) -> Vec<usize> {
    while cursor.start < sorted.len()
        && proximity(
            from,
            to,
            sorted[cursor.start].span_from(),
            sorted[cursor.start].span_to(),
            max_distance,
        ) == Ordering::Less
    {
        cursor.start += 1;
    }

    let mut found = Vec::new();
    for (i, candidate) in sorted.iter().enumerate().skip(cursor.start) {
        match proximity(
            from,
            to,
            candidate.span_from(),
            candidate.span_to(),
            max_distance,
        ) {
            Ordering::Greater => break,
            Ordering::Equal => found.push(i),
            Ordering::Less => {}
        }
    }
    found
}
