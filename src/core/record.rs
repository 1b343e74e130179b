use serde::{Deserialize, Serialize};

use crate::core::document::{Feature, Location, SeqRecord};
use crate::core::types::{AminoAcid, RecordKind, Strand, TrnaStatus};

/// One contiguous sub-interval of a record's genomic span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exon {
    pub from: i64,
    pub to: i64,
    pub strand: Strand,
}

impl Exon {
    pub fn new(from: i64, to: i64, strand: Strand) -> Self {
        Self { from, to, strand }
    }

    pub fn len(&self) -> i64 {
        self.to - self.from + 1
    }

    pub fn is_empty(&self) -> bool {
        self.to < self.from
    }
}

/// Back-reference to the document feature a record was built from.
///
/// Holds positions, never the feature itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerRef {
    pub seq_id: String,
    pub table: usize,
    pub feature: usize,
}

/// Normalized view of an annotated gene, CDS or RNA feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub kind: RecordKind,

    /// At least one exon; ascending by `from` unless the record wraps the origin
    pub exons: Vec<Exon>,

    /// Minimum `from` over the exons; sort and search key
    pub key: i64,

    pub name: String,
    pub description: String,

    /// Assigned by the gene resolver for products, taken from the feature for genes
    pub locus_tag: String,

    /// The span crosses the origin of a circular sequence
    pub wraps_origin: bool,

    pub owner: Option<OwnerRef>,
}

impl NormalizedRecord {
    /// Build a record from exons.
    ///
    /// `seq_length` is the length of the underlying sequence and is only used to
    /// detect spans crossing a circular origin: a multi-exon record whose
    /// `to - from` exceeds half the sequence keeps its exon order.
    ///
    /// Returns `None` when `exons` is empty.
    pub fn new(kind: RecordKind, mut exons: Vec<Exon>, seq_length: i64) -> Option<Self> {
        let first = exons.first()?;
        let last = exons.last()?;
        let wraps_origin = exons.len() > 1
            && seq_length > 0
            && (last.to - first.from).abs() > seq_length / 2;
        if !wraps_origin {
            exons.sort_by_key(|e| e.from);
        }
        let key = exons.iter().map(|e| e.from).min()?;
        Some(Self {
            kind,
            exons,
            key,
            name: String::new(),
            description: String::new(),
            locus_tag: String::new(),
            wraps_origin,
            owner: None,
        })
    }

    /// Single-exon convenience constructor
    pub fn span(kind: RecordKind, from: i64, to: i64, strand: Strand) -> Self {
        Self {
            kind,
            exons: vec![Exon::new(from, to, strand)],
            key: from,
            name: String::new(),
            description: String::new(),
            locus_tag: String::new(),
            wraps_origin: false,
            owner: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_locus_tag(mut self, locus_tag: impl Into<String>) -> Self {
        self.locus_tag = locus_tag.into();
        self
    }

    /// Convert a document feature, collapsing its open key into `RecordKind`.
    ///
    /// Returns `None` for features without intervals.
    pub fn from_feature(
        feature: &Feature,
        seq: &SeqRecord,
        table: usize,
        index: usize,
    ) -> Option<Self> {
        let kind = classify_feature(feature);
        let exons = exons_of(&feature.location);
        let mut record = Self::new(kind, exons, seq.length)?;

        record.name = match kind {
            RecordKind::Trna {
                amino_acid: Some(aa),
                ..
            } => format!("tRNA-{aa}"),
            _ => feature
                .product
                .clone()
                .or_else(|| feature.locus_tag.clone())
                .unwrap_or_else(|| kind.label().to_string()),
        };
        record.description = feature
            .product
            .clone()
            .or_else(|| feature.comment.clone())
            .unwrap_or_default();
        if kind == RecordKind::Gene {
            record.locus_tag = feature.locus_tag.clone().unwrap_or_default();
        }
        record.owner = Some(OwnerRef {
            seq_id: seq.id.clone(),
            table,
            feature: index,
        });
        Some(record)
    }

    /// First exon's `from`
    pub fn first_from(&self) -> i64 {
        self.exons.first().map_or(self.key, |e| e.from)
    }

    /// Last exon's `to`
    pub fn last_to(&self) -> i64 {
        self.exons.last().map_or(self.key, |e| e.to)
    }

    /// Leftmost coordinate (same as `key`)
    pub fn from(&self) -> i64 {
        self.key
    }

    /// Rightmost coordinate
    pub fn to(&self) -> i64 {
        self.exons.iter().map(|e| e.to).max().unwrap_or(self.key)
    }

    pub fn strand(&self) -> Strand {
        self.exons.first().map_or(Strand::Unknown, |e| e.strand)
    }

    /// Number of bases covered by the exons
    pub fn span_len(&self) -> i64 {
        self.exons.iter().map(Exon::len).sum()
    }

    pub fn seq_id(&self) -> &str {
        self.owner.as_ref().map_or("", |o| o.seq_id.as_str())
    }

    /// Display identity: `"<seq-id>|<name>:<from>-<to>"`
    pub fn display_identity(&self) -> String {
        format!(
            "{}|{}:{}-{}",
            self.seq_id(),
            self.name,
            self.from(),
            self.to()
        )
    }

    /// Identity problems are recorded under: the locus tag once assigned
    pub fn identity(&self) -> String {
        if self.locus_tag.is_empty() {
            self.display_identity()
        } else {
            self.locus_tag.clone()
        }
    }

    /// Every alias this record may be stored under
    pub fn identities(&self) -> Vec<String> {
        let mut ids = vec![self.display_identity()];
        if !self.locus_tag.is_empty() {
            ids.push(self.locus_tag.clone());
        }
        ids
    }
}

/// A structural RNA predicted by an external tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalRnaRecord {
    pub record: NormalizedRecord,

    /// Sequence the prediction was made on
    pub seq_id: String,

    /// Predictor / method tag ("tRNAscan-SE", "barrnap", ...)
    pub method: String,

    /// Predictor confidence score, when reported
    pub score: Option<f64>,

    /// Set once an annotated record has been matched to this prediction
    pub present: bool,
}

impl ExternalRnaRecord {
    pub fn new(seq_id: impl Into<String>, record: NormalizedRecord, method: impl Into<String>) -> Self {
        Self {
            record,
            seq_id: seq_id.into(),
            method: method.into(),
            score: None,
            present: false,
        }
    }

    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn key(&self) -> i64 {
        self.record.key
    }

    pub fn label(&self) -> String {
        format!(
            "{} {}:{}-{}({})",
            self.record.name,
            self.seq_id,
            self.record.from(),
            self.record.to(),
            self.record.strand()
        )
    }
}

/// Exons of a document location, in location order
pub fn exons_of(location: &Location) -> Vec<Exon> {
    location
        .intervals
        .iter()
        .map(|i| Exon::new(i.from, i.to, i.strand))
        .collect()
}

/// Amino acid of a tRNA feature, if it carries one
pub fn get_trna_amino_acid(feature: &Feature) -> Option<AminoAcid> {
    feature
        .amino_acid
        .as_deref()
        .and_then(AminoAcid::parse)
        .or_else(|| feature.product.as_deref().and_then(AminoAcid::parse))
}

fn trna_status(feature: &Feature) -> TrnaStatus {
    if feature.pseudo {
        TrnaStatus::Pseudo
    } else if feature
        .comment
        .as_deref()
        .is_some_and(|c| c.to_lowercase().contains("atypical"))
    {
        TrnaStatus::Atypical
    } else {
        TrnaStatus::Normal
    }
}

/// Closed classification of an open document feature key
pub fn classify_feature(feature: &Feature) -> RecordKind {
    match feature.key.as_str() {
        "CDS" | "cds" => RecordKind::Cds,
        "gene" => RecordKind::Gene,
        "tRNA" | "trna" => RecordKind::Trna {
            amino_acid: get_trna_amino_acid(feature),
            status: trna_status(feature),
        },
        "rRNA" | "rrna" => RecordKind::Rrna,
        "mRNA" | "mrna" => RecordKind::Mrna,
        "ncRNA" | "tmRNA" | "misc_RNA" | "ncrna" => RecordKind::OtherRna,
        _ => RecordKind::Unknown,
    }
}

/// Genes and products of one nucleotide record
#[derive(Debug, Clone, Default)]
pub struct SequenceRecords {
    pub genes: Vec<NormalizedRecord>,
    pub products: Vec<NormalizedRecord>,
}

impl SequenceRecords {
    /// Collect every gene, CDS and RNA feature of a nucleotide record
    pub fn collect(seq: &SeqRecord) -> Self {
        let mut records = Self::default();
        for (t, table) in seq.feature_tables.iter().enumerate() {
            for (i, feature) in table.features.iter().enumerate() {
                let Some(record) = NormalizedRecord::from_feature(feature, seq, t, i) else {
                    continue;
                };
                match record.kind {
                    RecordKind::Gene => records.genes.push(record),
                    RecordKind::Unknown => {}
                    _ => records.products.push(record),
                }
            }
        }
        records
    }
}
