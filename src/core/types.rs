use serde::{Deserialize, Serialize};

/// Strand of an interval on a nucleotide sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strand {
    Plus,
    Minus,
    #[default]
    Unknown,
}

impl Strand {
    /// Parse a strand symbol ('+', '-', '.', '?') as used by GFF and tabular reports
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "+" | "plus" => Strand::Plus,
            "-" | "minus" => Strand::Minus,
            _ => Strand::Unknown,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
            Self::Unknown => '.',
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Molecule type of a record in the sequence document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Molecule {
    #[default]
    Nucleic,
    Protein,
}

/// Topology of a nucleotide sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    #[default]
    Linear,
    Circular,
}

/// Confidence class of an annotated tRNA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrnaStatus {
    #[default]
    Normal,
    /// Structurally unusual call, still believed functional
    Atypical,
    /// Pseudogene
    Pseudo,
}

/// Closed classification of a normalized record.
///
/// The open, string-typed feature kinds of the document are collapsed into this
/// variant once, when a feature is converted into a `NormalizedRecord`; the
/// analysis code only ever matches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Cds,
    Gene,
    Trna {
        amino_acid: Option<AminoAcid>,
        status: TrnaStatus,
    },
    Rrna,
    Mrna,
    OtherRna,
    Unknown,
}

impl RecordKind {
    pub fn is_rna(&self) -> bool {
        matches!(
            self,
            Self::Trna { .. } | Self::Rrna | Self::Mrna | Self::OtherRna
        )
    }

    pub fn is_trna(&self) -> bool {
        matches!(self, Self::Trna { .. })
    }

    /// Structural RNAs are the ones predicted by external RNA finders
    pub fn is_structural_rna(&self) -> bool {
        matches!(self, Self::Trna { .. } | Self::Rrna)
    }

    /// True when both kinds belong to the same structural class (tRNA vs rRNA)
    pub fn same_rna_class(&self, other: &RecordKind) -> bool {
        matches!(
            (self, other),
            (Self::Trna { .. }, Self::Trna { .. }) | (Self::Rrna, Self::Rrna)
        )
    }

    pub fn amino_acid(&self) -> Option<AminoAcid> {
        match self {
            Self::Trna { amino_acid, .. } => *amino_acid,
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Cds => "CDS",
            Self::Gene => "gene",
            Self::Trna { .. } => "tRNA",
            Self::Rrna => "rRNA",
            Self::Mrna => "mRNA",
            Self::OtherRna => "ncRNA",
            Self::Unknown => "unknown",
        }
    }
}

/// Amino acid charged by a tRNA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AminoAcid {
    Ala,
    Arg,
    Asn,
    Asp,
    Cys,
    Gln,
    Glu,
    Gly,
    His,
    Ile,
    Leu,
    Lys,
    Met,
    Phe,
    Pro,
    Ser,
    Thr,
    Trp,
    Tyr,
    Val,
    Sec,
    Pyl,
}

impl AminoAcid {
    /// Parse a three-letter code or a tRNAscan-SE isotype.
    ///
    /// Initiator and isoleucine-2 isotypes collapse onto their amino acid; suppressor
    /// and undetermined isotypes have no amino acid and yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix("tRNA-").unwrap_or(s);
        match s.to_lowercase().as_str() {
            "ala" | "a" => Some(Self::Ala),
            "arg" | "r" => Some(Self::Arg),
            "asn" | "n" => Some(Self::Asn),
            "asp" | "d" => Some(Self::Asp),
            "cys" | "c" => Some(Self::Cys),
            "gln" | "q" => Some(Self::Gln),
            "glu" | "e" => Some(Self::Glu),
            "gly" | "g" => Some(Self::Gly),
            "his" | "h" => Some(Self::His),
            "ile" | "ile2" | "i" => Some(Self::Ile),
            "leu" | "l" => Some(Self::Leu),
            "lys" | "k" => Some(Self::Lys),
            "met" | "imet" | "fmet" | "m" => Some(Self::Met),
            "phe" | "f" => Some(Self::Phe),
            "pro" | "p" => Some(Self::Pro),
            "ser" | "s" => Some(Self::Ser),
            "thr" | "t" => Some(Self::Thr),
            "trp" | "w" => Some(Self::Trp),
            "tyr" | "y" => Some(Self::Tyr),
            "val" | "v" => Some(Self::Val),
            "sec" | "selcys" | "u" => Some(Self::Sec),
            "pyl" | "o" => Some(Self::Pyl),
            _ => None,
        }
    }
}

impl std::fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Self::Ala => "Ala",
            Self::Arg => "Arg",
            Self::Asn => "Asn",
            Self::Asp => "Asp",
            Self::Cys => "Cys",
            Self::Gln => "Gln",
            Self::Glu => "Glu",
            Self::Gly => "Gly",
            Self::His => "His",
            Self::Ile => "Ile",
            Self::Leu => "Leu",
            Self::Lys => "Lys",
            Self::Met => "Met",
            Self::Phe => "Phe",
            Self::Pro => "Pro",
            Self::Ser => "Ser",
            Self::Thr => "Thr",
            Self::Trp => "Trp",
            Self::Tyr => "Tyr",
            Self::Val => "Val",
            Self::Sec => "SeC",
            Self::Pyl => "Pyl",
        };
        write!(f, "{code}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strand_parse() {
        assert_eq!(Strand::parse("+"), Strand::Plus);
        assert_eq!(Strand::parse("-"), Strand::Minus);
        assert_eq!(Strand::parse("."), Strand::Unknown);
        assert_eq!(Strand::parse("?"), Strand::Unknown);
    }

    #[test]
    fn test_amino_acid_parse() {
        assert_eq!(AminoAcid::parse("Ala"), Some(AminoAcid::Ala));
        assert_eq!(AminoAcid::parse("tRNA-Gly"), Some(AminoAcid::Gly));
        assert_eq!(AminoAcid::parse("iMet"), Some(AminoAcid::Met));
        assert_eq!(AminoAcid::parse("Ile2"), Some(AminoAcid::Ile));
        assert_eq!(AminoAcid::parse("SeC"), Some(AminoAcid::Sec));
        assert_eq!(AminoAcid::parse("Undet"), None);
        assert_eq!(AminoAcid::parse("Sup"), None);
        assert_eq!(AminoAcid::Sec.to_string(), "SeC");
    }

    #[test]
    fn test_rna_class() {
        let trna = RecordKind::Trna {
            amino_acid: Some(AminoAcid::Ala),
            status: TrnaStatus::Normal,
        };
        let other_trna = RecordKind::Trna {
            amino_acid: None,
            status: TrnaStatus::Pseudo,
        };
        assert!(trna.same_rna_class(&other_trna));
        assert!(!trna.same_rna_class(&RecordKind::Rrna));
        assert!(!RecordKind::Cds.is_rna());
        assert!(RecordKind::Rrna.is_structural_rna());
        assert!(!RecordKind::Mrna.is_structural_rna());
    }
}
