//! End-to-end checks of the analysis on small hand-built genomes.
//!
//! Each test builds the records it needs through the public API and checks the
//! diagnostics that come out.

use annot_qc::analysis::collision::check_rna_overlaps;
use annot_qc::analysis::frameshift::classify;
use annot_qc::analysis::protein_checks::check_protein;
use annot_qc::analysis::rna::{match_trna, TrnaMatch};
use annot_qc::core::document::{Feature, Location, SeqRecord};
use annot_qc::core::protein::{GenomicLocation, ProteinAnnotation};
use annot_qc::{
    AlignmentHit, AminoAcid, DiagnosticsStore, Document, ExternalRnaRecord, HitSource,
    NormalizedRecord, ProblemKind, ProblemMask, QcEngine, RecordKind, Strand, Thresholds,
    TrnaStatus,
};

fn protein(id: &str, description: &str, from: i64, to: i64) -> ProteinAnnotation {
    ProteinAnnotation::new(id, description, (to - from + 1) / 3)
        .at(GenomicLocation::span("contig1", from, to, Strand::Plus))
}

fn hit(subject: &str, q: (i64, i64, i64), s: (i64, i64, i64)) -> AlignmentHit {
    AlignmentHit::new(subject, vec![subject.to_string()])
        .query(q.0, q.1, q.2)
        .subject(s.0, s.1, s.2)
}

/// Both halves of a 200-residue homolog, shared through two subjects
fn split_gene_hits() -> HitSource {
    let mut hits = HitSource::new();
    for subject in ["S1", "S2"] {
        hits.add("left", hit(subject, (1, 50, 50), (1, 50, 200)));
        hits.add("right", hit(subject, (1, 47, 47), (60, 106, 200)));
    }
    hits
}

fn ala() -> RecordKind {
    RecordKind::Trna {
        amino_acid: Some(AminoAcid::Ala),
        status: TrnaStatus::Normal,
    }
}

#[test]
fn adjacent_halves_of_one_homolog_are_a_frameshift() {
    let left = protein("left", "DNA polymerase III subunit alpha", 100, 250);
    let right = protein("right", "DNA polymerase III subunit alpha", 260, 400);

    let verdict = classify(&left, &right, &split_gene_hits(), &Thresholds::default()).unwrap();
    assert!(verdict.frameshift);
    assert_eq!(verdict.space, 4);
    assert_eq!(verdict.common_subject.as_deref(), Some("S1"));
}

#[test]
fn exonerating_hit_clears_the_pair() {
    let left = protein("left", "DNA polymerase III subunit alpha", 100, 250);
    let right = protein("right", "DNA polymerase III subunit alpha", 260, 400);
    let mut hits = split_gene_hits();
    // Covers the whole query and nearly the whole subject
    hits.add("left", hit("S3", (1, 50, 50), (1, 50, 52)));

    let verdict = classify(&left, &right, &hits, &Thresholds::default()).unwrap();
    assert!(!verdict.frameshift);
}

#[test]
fn classifier_is_deterministic() {
    let left = protein("left", "hypothetical protein", 100, 250);
    let right = protein("right", "DNA polymerase III subunit alpha", 260, 400);
    let hits = split_gene_hits();
    let first = classify(&left, &right, &hits, &Thresholds::default()).unwrap();
    for _ in 0..10 {
        assert_eq!(classify(&left, &right, &hits, &Thresholds::default()).unwrap(), first);
    }
}

#[test]
fn trna_on_the_wrong_strand_or_missing() {
    let annotated = NormalizedRecord::span(ala(), 500, 572, Strand::Plus);
    let predictions = vec![ExternalRnaRecord::new(
        "contig1",
        NormalizedRecord::span(ala(), 505, 570, Strand::Minus),
        "tRNAscan-SE",
    )];
    assert_eq!(match_trna(&annotated, &predictions), TrnaMatch::BadStrand);
    assert_eq!(match_trna(&annotated, &[]), TrnaMatch::Missing);
}

#[test]
fn rna_colliding_with_cds() {
    let trna = NormalizedRecord::span(ala(), 1950, 2100, Strand::Plus)
        .with_name("tRNA-Ala")
        .with_locus_tag("T_2");

    let mut store = DiagnosticsStore::new();
    check_rna_overlaps(
        std::slice::from_ref(&trna),
        &[protein("cds1", "DNA gyrase subunit A", 1000, 2000)],
        30,
        &mut store,
    );
    assert!(store.has("T_2", ProblemKind::RnaOverlap.into()));
    assert!(store.has("cds1", ProblemKind::RnaOverlap.into()));
    assert!(store.collect_removal_candidates().is_empty());

    let mut store = DiagnosticsStore::new();
    check_rna_overlaps(
        std::slice::from_ref(&trna),
        &[protein("cds1", "hypothetical protein", 1000, 2000)],
        30,
        &mut store,
    );
    assert!(store.has("cds1", ProblemKind::RemoveOverlap.into()));
    assert!(!store.has("T_2", ProblemKind::RemoveOverlap.into()));
}

#[test]
fn short_protein_exempt_only_at_a_fuzzy_edge() {
    let mut store = DiagnosticsStore::new();
    let inside = ProteinAnnotation::new("p1", "hypothetical protein", 8)
        .at(GenomicLocation::span("contig1", 3000, 3026, Strand::Plus));
    check_protein(&inside, 10_000, 30, &mut store);
    let problem = &store.problems("p1")[0];
    assert_eq!(problem.kind, ProblemKind::ShortProtein);
    let span = problem.span.unwrap();
    assert_eq!((span.from, span.to), (3000, 3026));

    let mut location = GenomicLocation::span("contig1", 0, 26, Strand::Plus);
    location.partial_start = true;
    let at_edge = ProteinAnnotation::new("p2", "hypothetical protein", 8).at(location);
    check_protein(&at_edge, 10_000, 30, &mut store);
    assert!(store.problems("p2").is_empty());
}

fn genome() -> Document {
    let contig = SeqRecord::nucleotide("contig1", 10_000)
        .with_feature(
            Feature::new("gene", Location::interval(1000, 2000, Strand::Plus)).with_locus_tag("T_1"),
        )
        .with_feature(
            Feature::new("CDS", Location::interval(1000, 2000, Strand::Plus))
                .with_product("hypothetical protein")
                .with_product_id("prot1"),
        )
        .with_feature(
            Feature::new("gene", Location::interval(1950, 2022, Strand::Plus)).with_locus_tag("T_2"),
        )
        .with_feature(
            Feature::new("tRNA", Location::interval(1950, 2022, Strand::Plus)).with_amino_acid("Ala"),
        );
    let mut document =
        Document::new(vec![contig, SeqRecord::protein("prot1", 333, "hypothetical protein")]);
    document.attach_genomic_locations();
    document
}

#[test]
fn injected_annotations_round_trip() {
    let mut document = genome();
    let outcome = QcEngine::new(&document).run(&HitSource::new(), &[], &[]).unwrap();
    let store = outcome.store;
    let before = document.sequences[0].features().count();

    let added = store
        .inject_annotation(&mut document, "T_2", ProblemMask::ALL)
        .unwrap();
    // rna-overlap and tRNA-missing carry annotation messages
    assert_eq!(added, 2);

    let injected: Vec<&Feature> = document.sequences[0].features().skip(before).collect();
    assert_eq!(injected.len(), 2);
    for problem in store.problems("T_2") {
        let span = problem.span.unwrap();
        let message = problem.annotation_message.as_deref().unwrap();
        let feature = injected
            .iter()
            .find(|f| f.comment.as_deref() == Some(message))
            .unwrap();
        assert_eq!(feature.key, "misc_feature");
        let interval = &feature.location.intervals[0];
        assert_eq!(
            (interval.from, interval.to, interval.strand),
            (span.from, span.to, span.strand)
        );
    }
}

#[test]
fn removal_deletes_hypothetical_cds_and_protein() {
    let mut document = genome();
    let outcome = QcEngine::new(&document).run(&HitSource::new(), &[], &[]).unwrap();
    let candidates = outcome.store.collect_removal_candidates();
    assert_eq!(candidates.iter().collect::<Vec<_>>(), vec!["prot1"]);

    let summary = annot_qc::diagnostics::removal::apply_removals(
        &mut document,
        &candidates,
        &outcome.owners,
        &outcome.locus_tags,
    );
    assert_eq!(summary.proteins, 1);
    assert_eq!(summary.features, 2);
    assert_eq!(outcome.locus_tags.get("prot1").map(String::as_str), Some("T_1"));
    assert!(document.find_sequence("prot1").is_none());
    assert!(document.sequences[0].features().all(|f| f.key != "CDS"));
    let genes: Vec<_> = document.sequences[0]
        .features()
        .filter(|f| f.key == "gene")
        .filter_map(|f| f.locus_tag.as_deref())
        .collect();
    assert_eq!(genes, vec!["T_2"]);
}
