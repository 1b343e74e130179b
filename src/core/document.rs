//! In-memory sequence document.
//!
//! A document is a flat list of nucleotide and protein records. Nucleotide records
//! carry feature tables with the draft annotation (genes, CDS, RNAs); protein
//! records carry their own features, one of which is a synthetic feature whose
//! comment starts with [`GENOMIC_LOCATION_MARKER`] and whose location is the
//! protein's span on its nucleotide sequence.
//!
//! Coordinates are 0-based and inclusive on both ends.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::core::error::QcError;
use crate::core::types::{Molecule, Strand, Topology};
use crate::utils::validation::strip_contig_prefix;

/// Comment prefix of the feature that attaches a protein to its genomic span
pub const GENOMIC_LOCATION_MARKER: &str = "genomic location";

/// Feature key of injected diagnostic features
pub const MISC_FEATURE_KEY: &str = "misc_feature";

fn is_false(b: &bool) -> bool {
    !*b
}

/// One contiguous interval of a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub from: i64,
    pub to: i64,
    #[serde(default)]
    pub strand: Strand,
}

impl Interval {
    pub fn new(from: i64, to: i64, strand: Strand) -> Self {
        Self { from, to, strand }
    }
}

/// Location of a feature, possibly split into several intervals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Location {
    /// Sequence the intervals refer to, when it is not the record holding the feature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq_id: Option<String>,

    pub intervals: Vec<Interval>,

    /// The 5' end (in the direction of transcription) is fuzzy
    #[serde(default, skip_serializing_if = "is_false")]
    pub partial_start: bool,

    /// The 3' end (in the direction of transcription) is fuzzy
    #[serde(default, skip_serializing_if = "is_false")]
    pub partial_stop: bool,
}

impl Location {
    pub fn interval(from: i64, to: i64, strand: Strand) -> Self {
        Self {
            seq_id: None,
            intervals: vec![Interval::new(from, to, strand)],
            partial_start: false,
            partial_stop: false,
        }
    }

    #[must_use]
    pub fn on(mut self, seq_id: impl Into<String>) -> Self {
        self.seq_id = Some(seq_id.into());
        self
    }

    /// Leftmost genomic coordinate
    pub fn start(&self) -> Option<i64> {
        self.intervals.iter().map(|i| i.from).min()
    }

    /// Rightmost genomic coordinate
    pub fn stop(&self) -> Option<i64> {
        self.intervals.iter().map(|i| i.to).max()
    }

    pub fn strand(&self) -> Strand {
        self.intervals.first().map_or(Strand::Unknown, |i| i.strand)
    }
}

/// A feature of a record's feature table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature key as found in the source document ("gene", "CDS", "tRNA", ...)
    pub key: String,

    pub location: Location,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locus_tag: Option<String>,

    /// Product name (CDS, RNAs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,

    /// Id of the protein record translated from a CDS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    /// tRNA amino acid extension ("Ala", "tRNA-Ala", "fMet", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amino_acid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub pseudo: bool,
}

impl Feature {
    pub fn new(key: impl Into<String>, location: Location) -> Self {
        Self {
            key: key.into(),
            location,
            locus_tag: None,
            product: None,
            product_id: None,
            amino_acid: None,
            comment: None,
            pseudo: false,
        }
    }

    /// A `misc_feature` carrying a free-text comment
    pub fn misc(location: Location, comment: impl Into<String>) -> Self {
        let mut feature = Self::new(MISC_FEATURE_KEY, location);
        feature.comment = Some(comment.into());
        feature
    }

    #[must_use]
    pub fn with_locus_tag(mut self, locus_tag: impl Into<String>) -> Self {
        self.locus_tag = Some(locus_tag.into());
        self
    }

    #[must_use]
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    #[must_use]
    pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    #[must_use]
    pub fn with_amino_acid(mut self, amino_acid: impl Into<String>) -> Self {
        self.amino_acid = Some(amino_acid.into());
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn is_genomic_location(&self) -> bool {
        self.comment
            .as_deref()
            .is_some_and(|c| c.starts_with(GENOMIC_LOCATION_MARKER))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FeatureTable {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// A nucleotide or protein record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeqRecord {
    pub id: String,

    #[serde(default)]
    pub molecule: Molecule,

    /// Length in bases or residues
    pub length: i64,

    #[serde(default)]
    pub topology: Topology,

    /// Title; for proteins, the product description
    #[serde(default)]
    pub description: String,

    /// Nucleotide record a protein was translated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feature_tables: Vec<FeatureTable>,
}

impl SeqRecord {
    pub fn nucleotide(id: impl Into<String>, length: i64) -> Self {
        Self {
            id: id.into(),
            molecule: Molecule::Nucleic,
            length,
            topology: Topology::Linear,
            description: String::new(),
            parent: None,
            feature_tables: vec![FeatureTable::default()],
        }
    }

    pub fn protein(id: impl Into<String>, length: i64, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            molecule: Molecule::Protein,
            length,
            topology: Topology::Linear,
            description: description.into(),
            parent: None,
            feature_tables: Vec::new(),
        }
    }

    #[must_use]
    pub fn circular(mut self) -> Self {
        self.topology = Topology::Circular;
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_feature(mut self, feature: Feature) -> Self {
        if self.feature_tables.is_empty() {
            self.feature_tables.push(FeatureTable::default());
        }
        self.feature_tables[0].features.push(feature);
        self
    }

    pub fn is_protein(&self) -> bool {
        self.molecule == Molecule::Protein
    }

    pub fn is_nucleic(&self) -> bool {
        self.molecule == Molecule::Nucleic
    }

    /// All features of all tables, in table order
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.feature_tables.iter().flat_map(|t| t.features.iter())
    }

    /// The protein's genomic span, from its marker feature
    pub fn genomic_location(&self) -> Option<&Location> {
        self.features()
            .find(|f| f.is_genomic_location())
            .map(|f| &f.location)
    }
}

/// The whole annotated genome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    pub sequences: Vec<SeqRecord>,
}

impl Document {
    pub fn new(sequences: Vec<SeqRecord>) -> Self {
        Self { sequences }
    }

    /// Load a document from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `QcError::Io` if the file cannot be read or `QcError::Json` if it is
    /// not a valid document.
    pub fn load_from_file(path: &Path) -> Result<Self, QcError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a document from JSON text
    ///
    /// # Errors
    ///
    /// Returns `QcError::Json` if the text is not a valid document.
    pub fn from_json(json: &str) -> Result<Self, QcError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the document as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns `QcError::Io` or `QcError::Json` if writing fails.
    pub fn write_to_file(&self, path: &Path) -> Result<(), QcError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn nucleotides(&self) -> impl Iterator<Item = &SeqRecord> {
        self.sequences.iter().filter(|s| s.is_nucleic())
    }

    pub fn proteins(&self) -> impl Iterator<Item = &SeqRecord> {
        self.sequences.iter().filter(|s| s.is_protein())
    }

    pub fn find_sequence(&self, id: &str) -> Option<&SeqRecord> {
        self.sequences.iter().find(|s| s.id == id)
    }

    fn position_of(&self, id: &str) -> Option<usize> {
        self.sequences.iter().position(|s| s.id == id)
    }

    /// Index of the nucleotide record that owns a diagnostics identity.
    ///
    /// The identity may name a nucleotide record, a protein record (owned through
    /// its `parent` or the CDS that references it), a display form
    /// `"<seq-id>|<label>"`, or a locus tag.
    pub fn owning_nucleotide(&self, identity: &str) -> Option<usize> {
        if let Some(idx) = self.position_of(identity) {
            let record = &self.sequences[idx];
            if record.is_nucleic() {
                return Some(idx);
            }
            if let Some(parent) = &record.parent {
                return self.position_of(parent);
            }
            return self.sequences.iter().position(|s| {
                s.is_nucleic()
                    && s.features()
                        .any(|f| f.product_id.as_deref() == Some(identity))
            });
        }

        if let Some((prefix, _)) = identity.rsplit_once('|') {
            if let Some(idx) = self.position_of(prefix) {
                if self.sequences[idx].is_nucleic() {
                    return Some(idx);
                }
            }
        }

        let tag = strip_contig_prefix(identity);
        self.sequences.iter().position(|s| {
            s.is_nucleic() && s.features().any(|f| f.locus_tag.as_deref() == Some(tag))
        })
    }

    /// Append a feature to the first feature table of a record.
    ///
    /// Returns false when the record has no feature table.
    pub fn append_feature(&mut self, seq_index: usize, feature: Feature) -> bool {
        match self
            .sequences
            .get_mut(seq_index)
            .and_then(|s| s.feature_tables.first_mut())
        {
            Some(table) => {
                table.features.push(feature);
                true
            }
            None => false,
        }
    }

    /// Remove a record by id
    pub fn remove_sequence(&mut self, id: &str) -> Option<SeqRecord> {
        let idx = self.position_of(id)?;
        Some(self.sequences.remove(idx))
    }

    /// Give every protein referenced by a CDS a genomic-location marker feature.
    ///
    /// Proteins that already carry a marker are left alone. Returns the number of
    /// markers added.
    pub fn attach_genomic_locations(&mut self) -> usize {
        let mut spans: HashMap<String, (String, Location)> = HashMap::new();
        for seq in self.nucleotides() {
            for feature in seq.features() {
                if feature.key != "CDS" {
                    continue;
                }
                if let Some(product_id) = &feature.product_id {
                    let location = feature.location.clone().on(seq.id.clone());
                    spans.insert(product_id.clone(), (seq.id.clone(), location));
                }
            }
        }

        let mut added = 0;
        for protein in self.sequences.iter_mut().filter(|s| s.is_protein()) {
            if protein.genomic_location().is_some() {
                continue;
            }
            let Some((seq_id, location)) = spans.remove(&protein.id) else {
                continue;
            };
            let comment = format!(
                "{GENOMIC_LOCATION_MARKER}: {seq_id}:{}-{}",
                location.start().unwrap_or_default(),
                location.stop().unwrap_or_default()
            );
            if protein.parent.is_none() {
                protein.parent = Some(seq_id);
            }
            if protein.feature_tables.is_empty() {
                protein.feature_tables.push(FeatureTable::default());
            }
            protein.feature_tables[0]
                .features
                .push(Feature::new("region", location).with_comment(comment));
            added += 1;
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_document() -> Document {
        let contig = SeqRecord::nucleotide("contig1", 10_000)
            .with_feature(
                Feature::new("gene", Location::interval(100, 399, Strand::Plus))
                    .with_locus_tag("ABC_0001"),
            )
            .with_feature(
                Feature::new("CDS", Location::interval(100, 399, Strand::Plus))
                    .with_product_id("prot1"),
            );
        let protein = SeqRecord::protein("prot1", 99, "DNA polymerase");
        Document::new(vec![contig, protein])
    }

    #[test]
    fn test_attach_genomic_locations() {
        let mut doc = make_document();
        assert_eq!(doc.attach_genomic_locations(), 1);
        // Second pass leaves existing markers alone
        assert_eq!(doc.attach_genomic_locations(), 0);

        let protein = doc.find_sequence("prot1").unwrap();
        let location = protein.genomic_location().unwrap();
        assert_eq!(location.seq_id.as_deref(), Some("contig1"));
        assert_eq!(location.start(), Some(100));
        assert_eq!(location.stop(), Some(399));
        assert_eq!(protein.parent.as_deref(), Some("contig1"));
    }

    #[test]
    fn test_owning_nucleotide() {
        let doc = make_document();
        assert_eq!(doc.owning_nucleotide("contig1"), Some(0));
        // Protein without parent is found through the CDS product id
        assert_eq!(doc.owning_nucleotide("prot1"), Some(0));
        assert_eq!(doc.owning_nucleotide("contig1|tRNA-Ala:5-77"), Some(0));
        assert_eq!(doc.owning_nucleotide("ABC_0001"), Some(0));
        assert_eq!(doc.owning_nucleotide("contig9|ABC_0001"), Some(0));
        assert_eq!(doc.owning_nucleotide("nothing"), None);
    }

    #[test]
    fn test_append_feature_without_table() {
        let mut doc = make_document();
        let idx = doc.sequences.iter().position(|s| s.id == "prot1").unwrap();
        assert!(!doc.append_feature(idx, Feature::misc(Location::default(), "x")));
        assert!(doc.append_feature(0, Feature::misc(Location::default(), "x")));
    }

    #[test]
    fn test_json_roundtrip_defaults() {
        let json = r#"{"sequences": [
            {"id": "c1", "length": 500, "topology": "circular",
             "feature_tables": [{"features": [
                {"key": "tRNA", "location": {"intervals": [{"from": 10, "to": 80, "strand": "minus"}]},
                 "amino_acid": "Ala"}
             ]}]},
            {"id": "p1", "molecule": "protein", "length": 20, "description": "hypothetical protein"}
        ]}"#;
        let doc = Document::from_json(json).unwrap();
        assert_eq!(doc.nucleotides().count(), 1);
        assert_eq!(doc.proteins().count(), 1);
        let trna = doc.sequences[0].features().next().unwrap();
        assert_eq!(trna.location.strand(), Strand::Minus);
        assert!(!trna.location.partial_start);
        assert_eq!(doc.sequences[0].topology, Topology::Circular);
    }
}
