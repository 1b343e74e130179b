//! Removal pass: deletes records flagged for removal from the document.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

use crate::core::document::Document;
use crate::core::record::OwnerRef;
use crate::utils::validation::strip_contig_prefix;

/// What a removal pass deleted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalSummary {
    pub proteins: usize,
    pub features: usize,
    pub unresolved: usize,
}

/// Delete every candidate identity from the document.
///
/// A candidate naming a protein record removes the protein, the CDS features
/// translating it and the gene features carrying its locus tag (`locus_tags` maps
/// protein id -> locus tag). Any other candidate is looked up in `owners` (identity ->
/// feature positions), first as given and then with the contig prefix stripped;
/// the owning features are removed together with gene features sharing the
/// stripped locus tag.
pub fn apply_removals(
    document: &mut Document,
    candidates: &BTreeSet<String>,
    owners: &HashMap<String, Vec<OwnerRef>>,
    locus_tags: &HashMap<String, String>,
) -> RemovalSummary {
    let mut summary = RemovalSummary::default();
    // seq id -> (table, feature) positions, ordered so removal can run back to front
    let mut doomed: BTreeMap<String, BTreeSet<(usize, usize)>> = BTreeMap::new();

    for candidate in candidates {
        if document
            .find_sequence(candidate)
            .is_some_and(|s| s.is_protein())
        {
            document.remove_sequence(candidate);
            summary.proteins += 1;
            let gene_tag = locus_tags
                .get(candidate)
                .map(String::as_str)
                .filter(|tag| !tag.is_empty());
            for seq in document.sequences.iter().filter(|s| s.is_nucleic()) {
                for (t, table) in seq.feature_tables.iter().enumerate() {
                    for (i, feature) in table.features.iter().enumerate() {
                        let translates = feature.product_id.as_deref() == Some(candidate.as_str());
                        let is_gene = feature.key == "gene"
                            && gene_tag.is_some()
                            && feature.locus_tag.as_deref() == gene_tag;
                        if translates || is_gene {
                            doomed.entry(seq.id.clone()).or_default().insert((t, i));
                        }
                    }
                }
            }
            continue;
        }

        let tag = strip_contig_prefix(candidate);
        let Some(refs) = owners.get(candidate).or_else(|| owners.get(tag)) else {
            debug!("No record found for removal candidate {candidate}");
            summary.unresolved += 1;
            continue;
        };
        for owner in refs {
            doomed
                .entry(owner.seq_id.clone())
                .or_default()
                .insert((owner.table, owner.feature));
            if let Some(seq) = document.find_sequence(&owner.seq_id) {
                for (t, table) in seq.feature_tables.iter().enumerate() {
                    for (i, feature) in table.features.iter().enumerate() {
                        if feature.key == "gene" && feature.locus_tag.as_deref() == Some(tag) {
                            doomed.entry(seq.id.clone()).or_default().insert((t, i));
                        }
                    }
                }
            }
        }
    }

    for (seq_id, positions) in doomed {
        let Some(seq) = document.sequences.iter_mut().find(|s| s.id == seq_id) else {
            continue;
        };
        for &(t, i) in positions.iter().rev() {
            if let Some(table) = seq.feature_tables.get_mut(t) {
                if i < table.features.len() {
                    table.features.remove(i);
                    summary.features += 1;
                }
            }
        }
    }

    info!(
        "Removed {} proteins and {} features ({} candidates unresolved)",
        summary.proteins, summary.features, summary.unresolved
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::{Feature, Location, SeqRecord};
    use crate::core::types::Strand;

    fn make_document() -> Document {
        let contig = SeqRecord::nucleotide("contig1", 10_000)
            .with_feature(
                Feature::new("gene", Location::interval(100, 399, Strand::Plus))
                    .with_locus_tag("ABC_0001"),
            )
            .with_feature(
                Feature::new("CDS", Location::interval(100, 399, Strand::Plus))
                    .with_product_id("prot1"),
            )
            .with_feature(
                Feature::new("gene", Location::interval(500, 572, Strand::Plus))
                    .with_locus_tag("ABC_0002"),
            )
            .with_feature(
                Feature::new("tRNA", Location::interval(500, 572, Strand::Plus))
                    .with_amino_acid("Ala"),
            );
        Document::new(vec![contig, SeqRecord::protein("prot1", 99, "hypothetical protein")])
    }

    #[test]
    fn test_remove_protein_and_cds() {
        let mut doc = make_document();
        let candidates: BTreeSet<String> = ["prot1".to_string()].into_iter().collect();
        let summary = apply_removals(&mut doc, &candidates, &HashMap::new(), &HashMap::new());
        assert_eq!(summary.proteins, 1);
        assert_eq!(summary.features, 1);
        assert!(doc.find_sequence("prot1").is_none());
        assert!(doc.sequences[0].features().all(|f| f.key != "CDS"));
    }

    #[test]
    fn test_remove_protein_takes_its_gene() {
        let mut doc = make_document();
        let candidates: BTreeSet<String> = ["prot1".to_string()].into_iter().collect();
        let locus_tags: HashMap<String, String> =
            [("prot1".to_string(), "ABC_0001".to_string())].into_iter().collect();
        let summary = apply_removals(&mut doc, &candidates, &HashMap::new(), &locus_tags);
        assert_eq!(summary.proteins, 1);
        assert_eq!(summary.features, 2);
        let tags: Vec<_> = doc.sequences[0]
            .features()
            .filter(|f| f.key == "gene")
            .filter_map(|f| f.locus_tag.as_deref())
            .collect();
        assert_eq!(tags, vec!["ABC_0002"]);
    }

    #[test]
    fn test_remove_by_locus_tag_with_prefix() {
        let mut doc = make_document();
        let mut owners = HashMap::new();
        owners.insert(
            "ABC_0002".to_string(),
            vec![OwnerRef {
                seq_id: "contig1".to_string(),
                table: 0,
                feature: 3,
            }],
        );
        let candidates: BTreeSet<String> = ["contig1|ABC_0002".to_string()].into_iter().collect();
        let summary = apply_removals(&mut doc, &candidates, &owners, &HashMap::new());
        // tRNA and its gene
        assert_eq!(summary.features, 2);
        let keys: Vec<_> = doc.sequences[0].features().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["gene", "CDS"]);
    }

    #[test]
    fn test_unresolved_candidate() {
        let mut doc = make_document();
        let candidates: BTreeSet<String> = ["nothing".to_string()].into_iter().collect();
        let summary = apply_removals(&mut doc, &candidates, &HashMap::new(), &HashMap::new());
        assert_eq!(summary.unresolved, 1);
        assert_eq!(doc.sequences[0].features().count(), 4);
    }
}
