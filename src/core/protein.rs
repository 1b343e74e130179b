use crate::core::document::{Document, SeqRecord};
use crate::core::record::{exons_of, Exon};
use crate::core::types::{Molecule, Strand};

/// Genomic span of a protein, read from its genomic-location marker feature
#[derive(Debug, Clone, PartialEq)]
pub struct GenomicLocation {
    pub seq_id: String,
    pub exons: Vec<Exon>,
    pub partial_start: bool,
    pub partial_stop: bool,
    pub wraps_origin: bool,
}

impl GenomicLocation {
    pub fn span(seq_id: impl Into<String>, from: i64, to: i64, strand: Strand) -> Self {
        Self {
            seq_id: seq_id.into(),
            exons: vec![Exon::new(from, to, strand)],
            partial_start: false,
            partial_stop: false,
            wraps_origin: false,
        }
    }

    pub fn from(&self) -> i64 {
        self.exons.iter().map(|e| e.from).min().unwrap_or_default()
    }

    pub fn to(&self) -> i64 {
        self.exons.iter().map(|e| e.to).max().unwrap_or_default()
    }

    pub fn strand(&self) -> Strand {
        self.exons.first().map_or(Strand::Unknown, |e| e.strand)
    }

    /// Fuzzy flag of the leftmost coordinate (5' on plus, 3' on minus)
    pub fn partial_left(&self) -> bool {
        match self.strand() {
            Strand::Minus => self.partial_stop,
            _ => self.partial_start,
        }
    }

    /// Fuzzy flag of the rightmost coordinate (3' on plus, 5' on minus)
    pub fn partial_right(&self) -> bool {
        match self.strand() {
            Strand::Minus => self.partial_start,
            _ => self.partial_stop,
        }
    }
}

/// A protein record together with its out-of-band genomic location
#[derive(Debug, Clone, PartialEq)]
pub struct ProteinAnnotation {
    pub id: String,
    pub description: String,

    /// Length in residues
    pub length: i64,

    pub molecule: Molecule,

    /// Locus tag of the CDS that produced the protein, when known
    pub locus_tag: String,

    pub location: Option<GenomicLocation>,
}

impl ProteinAnnotation {
    pub fn new(id: impl Into<String>, description: impl Into<String>, length: i64) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            length,
            molecule: Molecule::Protein,
            locus_tag: String::new(),
            location: None,
        }
    }

    #[must_use]
    pub fn at(mut self, location: GenomicLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Build from a protein record; the location comes from the marker feature
    pub fn from_record(protein: &SeqRecord, document: &Document) -> Self {
        let location = protein.genomic_location().and_then(|loc| {
            let seq_id = loc.seq_id.clone().or_else(|| protein.parent.clone())?;
            let exons = exons_of(loc);
            if exons.is_empty() {
                return None;
            }
            let seq_length = document.find_sequence(&seq_id).map_or(0, |s| s.length);
            let wraps_origin = exons.len() > 1
                && seq_length > 0
                && (exons[exons.len() - 1].to - exons[0].from).abs() > seq_length / 2;
            Some(GenomicLocation {
                seq_id,
                exons,
                partial_start: loc.partial_start,
                partial_stop: loc.partial_stop,
                wraps_origin,
            })
        });

        Self {
            id: protein.id.clone(),
            description: protein.description.clone(),
            length: protein.length,
            molecule: protein.molecule,
            locus_tag: String::new(),
            location,
        }
    }

    /// Sort key along the genome
    pub fn genomic_from(&self) -> Option<i64> {
        self.location.as_ref().map(GenomicLocation::from)
    }
}
