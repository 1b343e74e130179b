use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::analysis::collision::{check_cds_overlaps, check_rna_overlaps};
use crate::analysis::frameshift::{classify, record_verdict};
use crate::analysis::protein_checks::check_protein;
use crate::analysis::resolver::{resolve_genes, ResolverSummary};
use crate::analysis::rna::{match_na, simple_overlaps};
use crate::core::document::{Document, SeqRecord};
use crate::core::error::QcError;
use crate::core::hit::HitSource;
use crate::core::protein::ProteinAnnotation;
use crate::core::record::{ExternalRnaRecord, NormalizedRecord, OwnerRef, SequenceRecords};
use crate::core::types::RecordKind;
use crate::diagnostics::DiagnosticsStore;

/// Default minimum RNA/CDS overlap
pub const DEFAULT_RNA_OVERLAP: i64 = 30;

/// Default minimum CDS/CDS overlap
pub const DEFAULT_CDS_OVERLAP: i64 = 30;

/// Tunable limits of the analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum bases an RNA must share with a CDS to collide
    pub rna_overlap: i64,
    /// Minimum bases two CDS must share to overlap
    pub cds_overlap: i64,
    /// tRNA predictions scoring below this are ignored
    pub min_trna_score: f64,
    /// Proteins shorter than this (residues) are flagged
    pub min_protein_length: i64,
    /// Exonerating hits leave less than this fraction of the query unaligned
    pub query_tail_fraction: f64,
    /// Exonerating hits leave less than this fraction of the subject unaligned
    pub subject_tail_fraction: f64,
    /// Upper bound of the context-window radius
    pub max_context_distance: i64,
    /// Context-window radius per base of the flagged prediction
    pub context_span_factor: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            rna_overlap: DEFAULT_RNA_OVERLAP,
            cds_overlap: DEFAULT_CDS_OVERLAP,
            min_trna_score: 20.0,
            min_protein_length: 30,
            query_tail_fraction: 0.1,
            subject_tail_fraction: 0.1,
            max_context_distance: 5000,
            context_span_factor: 10,
        }
    }
}

impl Thresholds {
    /// Load thresholds from a JSON file; missing fields keep their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails validation.
    pub fn load_from_file(path: &Path) -> Result<Self, QcError> {
        let content = std::fs::read_to_string(path)?;
        let thresholds: Self = serde_json::from_str(&content)?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// # Errors
    ///
    /// Returns `QcError::InvalidThresholds` naming the first offending field.
    pub fn validate(&self) -> Result<(), QcError> {
        let non_negative = [
            ("rna_overlap", self.rna_overlap),
            ("cds_overlap", self.cds_overlap),
            ("min_protein_length", self.min_protein_length),
            ("max_context_distance", self.max_context_distance),
            ("context_span_factor", self.context_span_factor),
        ];
        for (name, value) in non_negative {
            if value < 0 {
                return Err(QcError::InvalidThresholds(format!(
                    "{name} must not be negative (got {value})"
                )));
            }
        }
        for (name, value) in [
            ("query_tail_fraction", self.query_tail_fraction),
            ("subject_tail_fraction", self.subject_tail_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(QcError::InvalidThresholds(format!(
                    "{name} must be within [0, 1] (got {value})"
                )));
            }
        }
        if !self.min_trna_score.is_finite() {
            return Err(QcError::InvalidThresholds(
                "min_trna_score must be a finite number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Counters of one run, for the summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub sequences: usize,
    pub genes: usize,
    pub products: usize,
    pub proteins: usize,
    pub genes_linked: usize,
    pub unmatched_genes: usize,
    pub unmatched_products: usize,
    pub short_or_partial: usize,
    pub cds_overlaps: usize,
    pub rna_collisions: usize,
    pub pairs_checked: usize,
    pub pairs_skipped: usize,
    pub frameshifts: usize,
    pub predictions: usize,
    pub predictions_low_score: usize,
    pub predictions_matched: usize,
    pub trna_problems: usize,
}

impl RunStats {
    fn add_resolver(&mut self, summary: ResolverSummary) {
        self.genes_linked += summary.exact + summary.nearest;
        self.unmatched_genes += summary.unmatched_genes;
        self.unmatched_products += summary.unmatched_products;
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Default)]
pub struct QcOutcome {
    pub store: DiagnosticsStore,

    /// Predictions with no annotated counterpart
    pub absent_rna_count: usize,

    /// Every identity alias of an annotated record -> the features it came from
    pub owners: HashMap<String, Vec<OwnerRef>>,

    /// Protein id -> locus tag of the CDS that produced it
    pub locus_tags: HashMap<String, String>,

    pub stats: RunStats,
}

/// The analysis pipeline over one document
pub struct QcEngine<'a> {
    document: &'a Document,
    thresholds: Thresholds,
}

impl<'a> QcEngine<'a> {
    /// Create an engine with default thresholds.
    ///
    /// Proteins are located through their genomic-location markers, so call
    /// [`Document::attach_genomic_locations`] first when the document lacks them.
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            thresholds: Thresholds::default(),
        }
    }

    pub fn with_thresholds(document: &'a Document, thresholds: Thresholds) -> Self {
        Self {
            document,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Run every check over every nucleotide sequence.
    ///
    /// # Errors
    ///
    /// Returns `QcError::NoSequences` for a document without nucleotide records and
    /// `QcError::MissingGenomicLocation` when a CDS product cannot be placed on
    /// the genome.
    pub fn run(
        &self,
        hits: &HitSource,
        trna: &[ExternalRnaRecord],
        rrna: &[ExternalRnaRecord],
    ) -> Result<QcOutcome, QcError> {
        if self.document.nucleotides().next().is_none() {
            return Err(QcError::NoSequences);
        }

        let mut outcome = QcOutcome::default();
        for seq in self.document.nucleotides() {
            self.check_sequence(seq, hits, trna, rrna, &mut outcome)?;
        }

        info!(
            "Checked {} sequences: {} proteins, {} identities with problems, {} RNA predictions absent",
            outcome.stats.sequences,
            outcome.stats.proteins,
            outcome.store.len(),
            outcome.absent_rna_count
        );
        Ok(outcome)
    }

    fn check_sequence(
        &self,
        seq: &SeqRecord,
        hits: &HitSource,
        trna: &[ExternalRnaRecord],
        rrna: &[ExternalRnaRecord],
        outcome: &mut QcOutcome,
    ) -> Result<(), QcError> {
        let t = &self.thresholds;
        let store = &mut outcome.store;
        let stats = &mut outcome.stats;
        stats.sequences += 1;

        let SequenceRecords {
            mut genes,
            mut products,
        } = SequenceRecords::collect(seq);
        stats.genes += genes.len();
        stats.products += products.len();
        debug!(
            "{}: {} genes, {} products",
            seq.id,
            genes.len(),
            products.len()
        );

        stats.add_resolver(resolve_genes(&mut genes, &mut products, store));
        register_owners(&mut outcome.owners, genes.iter().chain(products.iter()));

        let mut proteins = self.proteins_of(seq, &products)?;
        proteins.sort_by_key(|p| p.genomic_from());
        stats.proteins += proteins.len();
        for protein in proteins.iter().filter(|p| !p.locus_tag.is_empty()) {
            outcome
                .locus_tags
                .insert(protein.id.clone(), protein.locus_tag.clone());
        }

        for protein in &proteins {
            stats.short_or_partial += check_protein(protein, seq.length, t.min_protein_length, store);
        }
        stats.cds_overlaps += check_cds_overlaps(&proteins, t.cds_overlap, store);

        let rnas: Vec<NormalizedRecord> = products
            .iter()
            .filter(|p| p.kind.is_rna())
            .cloned()
            .collect();
        stats.rna_collisions += check_rna_overlaps(&rnas, &proteins, t.rna_overlap, store);

        for pair in proteins.windows(2) {
            stats.pairs_checked += 1;
            match classify(&pair[0], &pair[1], hits, t) {
                Ok(verdict) => {
                    if record_verdict(&pair[0], &pair[1], &verdict, store) {
                        stats.frameshifts += 1;
                    }
                }
                Err(skip) => {
                    stats.pairs_skipped += 1;
                    debug!("Frameshift check skipped: {skip}");
                }
            }
        }

        let mut trna_predictions: Vec<ExternalRnaRecord> = Vec::new();
        for prediction in trna.iter().filter(|p| p.seq_id == seq.id) {
            if prediction.score.is_some_and(|s| s < t.min_trna_score) {
                stats.predictions_low_score += 1;
                continue;
            }
            trna_predictions.push(prediction.clone());
        }
        trna_predictions.sort_by_key(ExternalRnaRecord::key);
        stats.trna_problems += match_na(&rnas, &mut trna_predictions, store);

        let mut predictions = trna_predictions;
        predictions.extend(rrna.iter().filter(|p| p.seq_id == seq.id).cloned());
        predictions.sort_by_key(ExternalRnaRecord::key);
        stats.predictions += predictions.len();

        outcome.absent_rna_count += simple_overlaps(
            &seq.id,
            &mut predictions,
            &rnas,
            t.context_span_factor,
            t.max_context_distance,
            store,
        );
        stats.predictions_matched += predictions.iter().filter(|p| p.present).count();
        Ok(())
    }

    /// Protein annotations of the CDS products of `seq`, carrying resolved locus tags
    fn proteins_of(
        &self,
        seq: &SeqRecord,
        products: &[NormalizedRecord],
    ) -> Result<Vec<ProteinAnnotation>, QcError> {
        let mut proteins = Vec::new();
        for cds in products.iter().filter(|p| p.kind == RecordKind::Cds) {
            let Some(owner) = &cds.owner else {
                continue;
            };
            let product_id = seq
                .feature_tables
                .get(owner.table)
                .and_then(|t| t.features.get(owner.feature))
                .and_then(|f| f.product_id.as_deref());
            let Some(product_id) = product_id else {
                warn!(
                    "CDS {} has no product id, skipping protein checks",
                    cds.display_identity()
                );
                continue;
            };

            let record = self
                .document
                .find_sequence(product_id)
                .filter(|s| s.is_protein())
                .ok_or_else(|| QcError::MissingGenomicLocation(product_id.to_string()))?;
            let mut protein = ProteinAnnotation::from_record(record, self.document);
            if protein.location.is_none() {
                return Err(QcError::MissingGenomicLocation(product_id.to_string()));
            }
            protein.locus_tag = cds.locus_tag.clone();
            proteins.push(protein);
        }
        Ok(proteins)
    }
}

fn register_owners<'r>(
    owners: &mut HashMap<String, Vec<OwnerRef>>,
    records: impl Iterator<Item = &'r NormalizedRecord>,
) {
    for record in records {
        let Some(owner) = &record.owner else {
            continue;
        };
        for identity in record.identities() {
            let refs = owners.entry(identity).or_default();
            if !refs.contains(owner) {
                refs.push(owner.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::{Feature, Location};
    use crate::core::types::Strand;
    use crate::diagnostics::ProblemKind;

    fn document() -> Document {
        let contig = SeqRecord::nucleotide("contig1", 10_000)
            .with_feature(Feature::new("gene", Location::interval(1000, 2000, Strand::Plus)).with_locus_tag("T_1"))
            .with_feature(
                Feature::new("CDS", Location::interval(1000, 2000, Strand::Plus))
                    .with_product("hypothetical protein")
                    .with_product_id("prot1"),
            )
            .with_feature(Feature::new("gene", Location::interval(1950, 2022, Strand::Plus)).with_locus_tag("T_2"))
            .with_feature(
                Feature::new("tRNA", Location::interval(1950, 2022, Strand::Plus)).with_amino_acid("Ala"),
            );
        let mut doc = Document::new(vec![contig, SeqRecord::protein("prot1", 333, "hypothetical protein")]);
        doc.attach_genomic_locations();
        doc
    }

    #[test]
    fn test_defaults_validate() {
        assert!(Thresholds::default().validate().is_ok());
        let bad = Thresholds {
            query_tail_fraction: 1.5,
            ..Thresholds::default()
        };
        assert!(matches!(bad.validate(), Err(QcError::InvalidThresholds(_))));
        let bad = Thresholds {
            cds_overlap: -1,
            ..Thresholds::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let t: Thresholds = serde_json::from_str(r#"{"cds_overlap": 60}"#).unwrap();
        assert_eq!(t.cds_overlap, 60);
        assert_eq!(t.rna_overlap, DEFAULT_RNA_OVERLAP);
    }

    #[test]
    fn test_run_pipeline() {
        let doc = document();
        let outcome = QcEngine::new(&doc).run(&HitSource::new(), &[], &[]).unwrap();

        assert_eq!(outcome.stats.genes_linked, 2);
        assert_eq!(outcome.stats.proteins, 1);
        assert!(outcome.store.has("T_2", ProblemKind::RnaOverlap.into()));
        assert!(outcome.store.has("prot1", ProblemKind::RemoveOverlap.into()));
        // No predictions at all: the tRNA is missing
        assert!(outcome.store.has("T_2", ProblemKind::TrnaMissing.into()));
        assert!(outcome.owners.contains_key("T_2"));
        assert!(outcome.owners.contains_key("contig1|tRNA-Ala:1950-2022"));
        assert_eq!(outcome.locus_tags.get("prot1").map(String::as_str), Some("T_1"));
    }

    #[test]
    fn test_matched_predictions_are_counted() {
        use crate::core::types::{AminoAcid, TrnaStatus};

        let doc = document();
        let kind = RecordKind::Trna {
            amino_acid: Some(AminoAcid::Ala),
            status: TrnaStatus::Normal,
        };
        let trna = vec![ExternalRnaRecord::new(
            "contig1",
            NormalizedRecord::span(kind, 1950, 2022, Strand::Plus),
            "tRNAscan-SE",
        )];
        let rrna = vec![ExternalRnaRecord::new(
            "contig1",
            NormalizedRecord::span(RecordKind::Rrna, 5000, 6500, Strand::Plus),
            "RNAmmer",
        )];
        let outcome = QcEngine::new(&doc).run(&HitSource::new(), &trna, &rrna).unwrap();

        assert_eq!(outcome.stats.predictions, 2);
        assert_eq!(outcome.stats.predictions_matched, 1);
        assert_eq!(outcome.absent_rna_count, 1);
        assert!(!outcome.store.has("T_2", ProblemKind::TrnaMissing.into()));
    }

    #[test]
    fn test_no_sequences_is_fatal() {
        let doc = Document::new(vec![SeqRecord::protein("p", 10, "x")]);
        assert!(matches!(
            QcEngine::new(&doc).run(&HitSource::new(), &[], &[]),
            Err(QcError::NoSequences)
        ));
    }

    #[test]
    fn test_unplaced_product_is_fatal() {
        let doc = Document::new(vec![
            SeqRecord::nucleotide("contig1", 5000).with_feature(
                Feature::new("CDS", Location::interval(10, 99, Strand::Plus)).with_product_id("gone"),
            ),
        ]);
        let result = QcEngine::new(&doc).run(&HitSource::new(), &[], &[]);
        assert!(matches!(result, Err(QcError::MissingGenomicLocation(id)) if id == "gone"));
    }
}
