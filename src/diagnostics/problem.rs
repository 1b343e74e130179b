use serde::{Deserialize, Serialize};

use crate::core::types::Strand;

/// Kind of a single diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemKind {
    Overlap,
    CompleteOverlap,
    RemoveOverlap,
    RnaOverlap,
    Frameshift,
    TrnaMissing,
    TrnaBadStrand,
    TrnaCompleteMismatch,
    TrnaMismatch,
    RnaAbsent,
    RnaBadStrand,
    RnaUndefStrand,
    ShortProtein,
    Partial,
    GeneMatchesMultiple,
    UnmatchedFeature,
    UnmatchedGene,
}

/// Severity separates QC findings from resolver bookkeeping warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Finding,
}

impl ProblemKind {
    pub const ALL: [ProblemKind; 17] = [
        Self::Overlap,
        Self::CompleteOverlap,
        Self::RemoveOverlap,
        Self::RnaOverlap,
        Self::Frameshift,
        Self::TrnaMissing,
        Self::TrnaBadStrand,
        Self::TrnaCompleteMismatch,
        Self::TrnaMismatch,
        Self::RnaAbsent,
        Self::RnaBadStrand,
        Self::RnaUndefStrand,
        Self::ShortProtein,
        Self::Partial,
        Self::GeneMatchesMultiple,
        Self::UnmatchedFeature,
        Self::UnmatchedGene,
    ];

    /// Bit of this kind in a `ProblemMask`
    pub fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Label used in text reports
    pub fn label(self) -> &'static str {
        match self {
            Self::Overlap => "overlap",
            Self::CompleteOverlap => "complete-overlap",
            Self::RemoveOverlap => "remove-overlap",
            Self::RnaOverlap => "rna-overlap",
            Self::Frameshift => "frameshift",
            Self::TrnaMissing => "tRNA-missing",
            Self::TrnaBadStrand => "tRNA-bad-strand",
            Self::TrnaCompleteMismatch => "tRNA-complete-mismatch",
            Self::TrnaMismatch => "tRNA-mismatch",
            Self::RnaAbsent => "RNA-absent",
            Self::RnaBadStrand => "RNA-bad-strand",
            Self::RnaUndefStrand => "RNA-undef-strand",
            Self::ShortProtein => "short-protein",
            Self::Partial => "partial",
            Self::GeneMatchesMultiple => "gene-matches-multiple",
            Self::UnmatchedFeature => "unmatched-feature",
            Self::UnmatchedGene => "unmatched-gene",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::GeneMatchesMultiple | Self::UnmatchedFeature | Self::UnmatchedGene => {
                Severity::Warning
            }
            _ => Severity::Finding,
        }
    }
}

impl std::fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Set of problem kinds, used to query and report groups of kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ProblemMask(u32);

impl ProblemMask {
    pub const NONE: ProblemMask = ProblemMask(0);
    pub const ALL: ProblemMask = ProblemMask((1 << ProblemKind::ALL.len()) - 1);

    pub const OVERLAPS: ProblemMask = ProblemMask::of(&[
        ProblemKind::Overlap,
        ProblemKind::CompleteOverlap,
        ProblemKind::RemoveOverlap,
        ProblemKind::RnaOverlap,
    ]);
    pub const FRAMESHIFTS: ProblemMask = ProblemMask::of(&[ProblemKind::Frameshift]);
    pub const TRNA: ProblemMask = ProblemMask::of(&[
        ProblemKind::TrnaMissing,
        ProblemKind::TrnaBadStrand,
        ProblemKind::TrnaCompleteMismatch,
        ProblemKind::TrnaMismatch,
    ]);
    pub const RNA: ProblemMask = ProblemMask::of(&[
        ProblemKind::RnaAbsent,
        ProblemKind::RnaBadStrand,
        ProblemKind::RnaUndefStrand,
    ]);
    pub const PROTEINS: ProblemMask =
        ProblemMask::of(&[ProblemKind::ShortProtein, ProblemKind::Partial]);
    pub const WARNINGS: ProblemMask = ProblemMask::of(&[
        ProblemKind::GeneMatchesMultiple,
        ProblemKind::UnmatchedFeature,
        ProblemKind::UnmatchedGene,
    ]);
    /// Kinds that make a record a removal candidate
    pub const REMOVAL: ProblemMask =
        ProblemMask::of(&[ProblemKind::Frameshift, ProblemKind::RemoveOverlap]);

    /// Mask of the given kinds
    pub const fn of(kinds: &[ProblemKind]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < kinds.len() {
            bits |= 1 << (kinds[i] as u32);
            i += 1;
        }
        ProblemMask(bits)
    }

    pub fn contains(self, kind: ProblemKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn intersects(self, other: ProblemMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Kinds in the mask, in declaration order
    pub fn kinds(self) -> impl Iterator<Item = ProblemKind> {
        ProblemKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl From<ProblemKind> for ProblemMask {
    fn from(kind: ProblemKind) -> Self {
        ProblemMask(kind.bit())
    }
}

impl std::ops::BitOr for ProblemMask {
    type Output = ProblemMask;

    fn bitor(self, rhs: ProblemMask) -> ProblemMask {
        ProblemMask(self.0 | rhs.0)
    }
}

impl std::ops::BitOr<ProblemKind> for ProblemMask {
    type Output = ProblemMask;

    fn bitor(self, rhs: ProblemKind) -> ProblemMask {
        ProblemMask(self.0 | rhs.bit())
    }
}

/// Genomic position a problem refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemSpan {
    pub from: i64,
    pub to: i64,
    pub strand: Strand,
}

/// One diagnostic. Refers to records by identity string only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub kind: ProblemKind,

    /// Free-text report; empty for companion entries
    pub report: String,

    /// Short message suitable for injecting back into the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<ProblemSpan>,

    /// Identities of the other records involved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paired: Vec<String>,
}

impl Problem {
    pub fn new(kind: ProblemKind, report: impl Into<String>) -> Self {
        Self {
            kind,
            report: report.into(),
            annotation_message: None,
            span: None,
            paired: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_annotation(mut self, message: impl Into<String>) -> Self {
        self.annotation_message = Some(message.into());
        self
    }

    #[must_use]
    pub fn at(mut self, from: i64, to: i64, strand: Strand) -> Self {
        self.span = Some(ProblemSpan { from, to, strand });
        self
    }

    #[must_use]
    pub fn paired_with(mut self, identity: impl Into<String>) -> Self {
        self.paired.push(identity.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}
