use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::utils::validation::{is_hypothetical, is_valid_range};

/// One homology-search hit of a query protein against a subject protein.
///
/// Aligned ranges are 1-based and inclusive, as reported by BLAST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentHit {
    /// Subject name / title
    pub subject: String,

    /// Identifiers of the subject (accessions, GIs), used to detect when two queries
    /// hit the same reference protein
    pub subject_ids: Vec<String>,

    pub subject_len: i64,
    pub query_len: i64,

    pub bit_score: f64,
    pub evalue: f64,
    pub percent_identity: f64,

    pub query_from: i64,
    pub query_to: i64,
    pub subject_from: i64,
    pub subject_to: i64,
}

impl AlignmentHit {
    pub fn new(subject: impl Into<String>, subject_ids: Vec<String>) -> Self {
        Self {
            subject: subject.into(),
            subject_ids,
            subject_len: 0,
            query_len: 0,
            bit_score: 0.0,
            evalue: 0.0,
            percent_identity: 0.0,
            query_from: 0,
            query_to: 0,
            subject_from: 0,
            subject_to: 0,
        }
    }

    /// Set the query side: aligned range and full query length
    #[must_use]
    pub fn query(mut self, from: i64, to: i64, len: i64) -> Self {
        self.query_from = from;
        self.query_to = to;
        self.query_len = len;
        self
    }

    /// Set the subject side: aligned range and full subject length
    #[must_use]
    pub fn subject(mut self, from: i64, to: i64, len: i64) -> Self {
        self.subject_from = from;
        self.subject_to = to;
        self.subject_len = len;
        self
    }

    /// Both aligned ranges lie within their sequences
    pub fn is_well_formed(&self) -> bool {
        is_valid_range(self.query_from, self.query_to, self.query_len)
            && is_valid_range(self.subject_from, self.subject_to, self.subject_len)
    }

    /// Query residues before the aligned region
    pub fn query_tail_left(&self) -> i64 {
        self.query_from - 1
    }

    /// Query residues after the aligned region
    pub fn query_tail_right(&self) -> i64 {
        self.query_len - self.query_to
    }

    /// Aligned query residues
    pub fn query_middle(&self) -> i64 {
        self.query_to - self.query_from + 1
    }

    /// Subject residues before the aligned region
    pub fn subject_tail_left(&self) -> i64 {
        self.subject_from - 1
    }

    /// Subject residues after the aligned region
    pub fn subject_tail_right(&self) -> i64 {
        self.subject_len - self.subject_to
    }

    /// Both hits name at least one common subject identifier
    pub fn shares_subject(&self, other: &AlignmentHit) -> bool {
        self.subject_ids
            .iter()
            .any(|id| other.subject_ids.iter().any(|o| o == id))
    }

    pub fn is_hypothetical(&self) -> bool {
        is_hypothetical(&self.subject)
    }
}

/// Parsed homology hits keyed by query identity, in report order
#[derive(Debug, Clone, Default)]
pub struct HitSource {
    hits: HashMap<String, Vec<AlignmentHit>>,
}

impl HitSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, query: impl Into<String>, hit: AlignmentHit) {
        self.hits.entry(query.into()).or_default().push(hit);
    }

    /// Hits of a query; empty when the query had none
    pub fn get(&self, query: &str) -> &[AlignmentHit] {
        self.hits.get(query).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of queries with at least one hit
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Total number of hits
    pub fn hit_count(&self) -> usize {
        self.hits.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tails() {
        let hit = AlignmentHit::new("DNA ligase", vec!["WP_1".into()])
            .query(5, 90, 100)
            .subject(11, 96, 120);
        assert!(hit.is_well_formed());
        assert_eq!(hit.query_tail_left(), 4);
        assert_eq!(hit.query_tail_right(), 10);
        assert_eq!(hit.query_middle(), 86);
        assert_eq!(hit.subject_tail_left(), 10);
        assert_eq!(hit.subject_tail_right(), 24);
    }

    #[test]
    fn test_shares_subject() {
        let a = AlignmentHit::new("x", vec!["gi|1".into(), "WP_2".into()]);
        let b = AlignmentHit::new("y", vec!["WP_2".into()]);
        let c = AlignmentHit::new("z", vec!["WP_3".into()]);
        assert!(a.shares_subject(&b));
        assert!(!a.shares_subject(&c));
    }

    #[test]
    fn test_malformed_hit() {
        let hit = AlignmentHit::new("x", vec![]).query(0, 10, 20).subject(1, 10, 20);
        assert!(!hit.is_well_formed());
    }

    #[test]
    fn test_hit_source() {
        let mut source = HitSource::new();
        source.add("p1", AlignmentHit::new("a", vec![]));
        source.add("p1", AlignmentHit::new("b", vec![]));
        assert_eq!(source.get("p1").len(), 2);
        assert!(source.get("p2").is_empty());
        assert_eq!(source.len(), 1);
        assert_eq!(source.hit_count(), 2);
    }
}
