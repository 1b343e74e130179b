//! Links gene records to their CDS/RNA products by coordinates.

use std::collections::HashSet;
use tracing::debug;

use crate::core::record::NormalizedRecord;
use crate::core::types::RecordKind;
use crate::diagnostics::{DiagnosticsStore, Problem, ProblemKind};

/// Counts of one resolver run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverSummary {
    /// Products linked because their boundaries equal the gene's
    pub exact: usize,
    /// Products linked as the tightest fit inside a gene
    pub nearest: usize,
    /// Genes with more than one unmatched CDS in their window
    pub ambiguous: usize,
    pub unmatched_products: usize,
    pub unmatched_genes: usize,
}

/// Assign gene locus tags to products.
///
/// Both lists are sorted by `key` (stable, so equal keys keep input order). Products
/// that already carry a locus tag, and genes whose tag is already carried by a
/// product, count as matched from the start. Only product records are modified.
///
/// A gene left over by the exact pass takes the tightest-fitting unmatched product
/// of its window, which runs from the first product at or after the gene start
/// through the first product ending past the gene. That last product is counted
/// toward `gene-matches-multiple` but is never a candidate.
pub fn resolve_genes(
    genes: &mut [NormalizedRecord],
    products: &mut [NormalizedRecord],
    store: &mut DiagnosticsStore,
) -> ResolverSummary {
    genes.sort_by_key(|g| g.key);
    products.sort_by_key(|p| p.key);

    let mut summary = ResolverSummary::default();
    let assigned: HashSet<String> = products
        .iter()
        .filter(|p| !p.locus_tag.is_empty())
        .map(|p| p.locus_tag.clone())
        .collect();
    let mut gene_done: Vec<bool> = genes
        .iter()
        .map(|g| !g.locus_tag.is_empty() && assigned.contains(&g.locus_tag))
        .collect();
    let mut product_done: Vec<bool> = products.iter().map(|p| !p.locus_tag.is_empty()).collect();

    // Exact pass: lockstep walk over equal keys
    let (mut i, mut j) = (0, 0);
    while i < genes.len() && j < products.len() {
        let gene_key = genes[i].key;
        let product_key = products[j].key;
        if product_key < gene_key {
            j += 1;
            continue;
        }
        if product_key > gene_key {
            i += 1;
            continue;
        }
        if !gene_done[i] {
            let (first_from, last_to) = (genes[i].first_from(), genes[i].last_to());
            let mut k = j;
            while k < products.len() && products[k].key == gene_key {
                if !product_done[k]
                    && products[k].first_from() == first_from
                    && products[k].last_to() == last_to
                {
                    products[k].locus_tag = genes[i].locus_tag.clone();
                    product_done[k] = true;
                    gene_done[i] = true;
                    summary.exact += 1;
                }
                k += 1;
            }
        }
        // The next gene may start at the same key
        i += 1;
    }

    // Nearest-fit pass
    let mut window_start = 0;
    for (g, gene) in genes.iter().enumerate() {
        if gene_done[g] {
            continue;
        }
        let (gene_from, gene_to) = (gene.from(), gene.to());
        while window_start < products.len() && products[window_start].key < gene_from {
            window_start += 1;
        }

        let mut unmatched_cds = 0;
        let mut best: Option<(i64, usize)> = None;
        for (k, product) in products.iter().enumerate().skip(window_start) {
            if product.key > gene_to {
                break;
            }
            if product_done[k] {
                continue;
            }
            if product.kind == RecordKind::Cds {
                unmatched_cds += 1;
            }
            // The window ends at the first product running past the gene
            if product.to() > gene_to {
                break;
            }
            let fit = (product.from() - gene_from) + (gene_to - product.to());
            if best.map_or(true, |(best_fit, _)| fit < best_fit) {
                best = Some((fit, k));
            }
        }

        if unmatched_cds > 1 {
            summary.ambiguous += 1;
            store.record(
                gene.identity(),
                Problem::new(
                    ProblemKind::GeneMatchesMultiple,
                    format!(
                        "gene {}..{} contains {unmatched_cds} unmatched CDS",
                        gene_from, gene_to
                    ),
                )
                .at(gene_from, gene_to, gene.strand()),
            );
        }

        if let Some((fit, k)) = best {
            debug!(
                "Gene {} matched to {} with fit {fit}",
                gene.identity(),
                products[k].name
            );
            products[k].locus_tag = gene.locus_tag.clone();
            product_done[k] = true;
            gene_done[g] = true;
            summary.nearest += 1;
        }
    }

    for (k, product) in products.iter().enumerate() {
        if product_done[k] {
            continue;
        }
        summary.unmatched_products += 1;
        store.record(
            product.identity(),
            Problem::new(
                ProblemKind::UnmatchedFeature,
                format!("{} {} has no gene", product.kind.label(), product.name),
            )
            .at(product.from(), product.to(), product.strand()),
        );
    }
    for (g, gene) in genes.iter().enumerate() {
        if gene_done[g] {
            continue;
        }
        summary.unmatched_genes += 1;
        store.record(
            gene.identity(),
            Problem::new(ProblemKind::UnmatchedGene, "gene has no CDS or RNA product")
                .at(gene.from(), gene.to(), gene.strand()),
        );
    }

    summary
}
