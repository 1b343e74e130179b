use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::warn;

use crate::analysis::engine::{QcEngine, QcOutcome, Thresholds};
use crate::cli::OutputFormat;
use crate::core::document::Document;
use crate::core::hit::HitSource;
use crate::diagnostics::removal::{apply_removals, RemovalSummary};
use crate::diagnostics::{DiagnosticsStore, ProblemKind, ProblemMask};
use crate::parsing::blast::parse_blast_file;
use crate::parsing::rrna::parse_rrna_file;
use crate::parsing::trnascan::parse_trnascan_file;

/// Report streams, one per group of problem kinds
pub const REPORT_GROUPS: [(&str, ProblemMask); 6] = [
    ("overlaps", ProblemMask::OVERLAPS),
    ("frameshifts", ProblemMask::FRAMESHIFTS),
    ("trna", ProblemMask::TRNA),
    ("rna", ProblemMask::RNA),
    ("proteins", ProblemMask::PROTEINS),
    ("warnings", ProblemMask::WARNINGS),
];

#[derive(Args)]
pub struct CheckArgs {
    /// Annotated genome document (JSON)
    #[arg(short, long)]
    pub document: PathBuf,

    /// BLAST tabular report of the annotated proteins (may be gzipped)
    #[arg(long)]
    pub hits: Option<PathBuf>,

    /// tRNAscan-SE tabular output; a missing file counts as no predictions
    #[arg(long)]
    pub trna: Option<PathBuf>,

    /// rRNA predictions as GFF; a missing file counts as no predictions
    #[arg(long)]
    pub rrna: Option<PathBuf>,

    /// JSON thresholds file; individual flags below override it
    #[arg(long)]
    pub thresholds: Option<PathBuf>,

    // === Threshold overrides ===
    /// Minimum RNA/CDS overlap in bases
    #[arg(long)]
    pub rna_overlap: Option<i64>,

    /// Minimum CDS/CDS overlap in bases
    #[arg(long)]
    pub cds_overlap: Option<i64>,

    /// Ignore tRNA predictions scoring below this
    #[arg(long)]
    pub min_trna_score: Option<f64>,

    /// Flag proteins shorter than this many residues
    #[arg(long)]
    pub min_protein_length: Option<i64>,

    /// Query tail fraction of an exonerating hit (0-1)
    #[arg(long)]
    pub query_tail_fraction: Option<f64>,

    /// Subject tail fraction of an exonerating hit (0-1)
    #[arg(long)]
    pub subject_tail_fraction: Option<f64>,

    /// Write one report file per problem group here instead of to stdout
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Write the (annotated / cleaned) document here
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Add a misc_feature for every problem to the document
    #[arg(long)]
    pub annotate: bool,

    /// Remove frameshifted and redundant records from the document
    #[arg(long)]
    pub remove: bool,
}

impl CheckArgs {
    fn thresholds(&self) -> anyhow::Result<Thresholds> {
        let mut t = match &self.thresholds {
            Some(path) => Thresholds::load_from_file(path)
                .with_context(|| format!("Failed to load thresholds from {}", path.display()))?,
            None => Thresholds::default(),
        };
        if let Some(v) = self.rna_overlap {
            t.rna_overlap = v;
        }
        if let Some(v) = self.cds_overlap {
            t.cds_overlap = v;
        }
        if let Some(v) = self.min_trna_score {
            t.min_trna_score = v;
        }
        if let Some(v) = self.min_protein_length {
            t.min_protein_length = v;
        }
        if let Some(v) = self.query_tail_fraction {
            t.query_tail_fraction = v;
        }
        if let Some(v) = self.subject_tail_fraction {
            t.subject_tail_fraction = v;
        }
        t.validate()?;
        Ok(t)
    }
}

/// Execute check subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be read or parsed, if the analysis hits a
/// fatal condition, or if an output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CheckArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let thresholds = args.thresholds()?;

    let mut document = Document::load_from_file(&args.document)
        .with_context(|| format!("Failed to load {}", args.document.display()))?;
    let markers = document.attach_genomic_locations();

    let hits = match &args.hits {
        Some(path) => parse_blast_file(path)
            .with_context(|| format!("Failed to parse hits from {}", path.display()))?,
        None => HitSource::new(),
    };
    let trna = match &args.trna {
        Some(path) => parse_trnascan_file(path)
            .with_context(|| format!("Failed to parse tRNA predictions from {}", path.display()))?,
        None => Vec::new(),
    };
    let rrna = match &args.rrna {
        Some(path) => parse_rrna_file(path)
            .with_context(|| format!("Failed to parse rRNA predictions from {}", path.display()))?,
        None => Vec::new(),
    };

    if verbose {
        eprintln!(
            "Loaded {} sequences ({markers} genomic locations attached), {} hits, {} tRNA and {} rRNA predictions",
            document.sequences.len(),
            hits.hit_count(),
            trna.len(),
            rrna.len()
        );
    }

    let mut outcome = QcEngine::with_thresholds(&document, thresholds).run(&hits, &trna, &rrna)?;

    let annotated = if args.annotate {
        annotate(&outcome.store, &mut document)
    } else {
        0
    };
    let candidates = outcome.store.collect_removal_candidates();
    let removed = if args.remove {
        Some(apply_removals(
            &mut document,
            &candidates,
            &outcome.owners,
            &outcome.locus_tags,
        ))
    } else {
        None
    };

    match format {
        OutputFormat::Text => print_text_summary(&outcome, annotated, removed.as_ref()),
        OutputFormat::Json => print_json_summary(&outcome, &candidates, annotated, removed.as_ref())?,
    }

    match &args.report_dir {
        Some(dir) => write_report_files(&mut outcome.store, dir)?,
        None if matches!(format, OutputFormat::Text) => {
            write_reports(&mut outcome.store, &mut io::stdout().lock())?;
        }
        None => {}
    }

    if let Some(path) = &args.output {
        document
            .write_to_file(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if verbose {
            eprintln!("Wrote document to {}", path.display());
        }
    }
    Ok(())
}

/// Inject every identity's problems; identities no record owns are skipped
fn annotate(store: &DiagnosticsStore, document: &mut Document) -> usize {
    let identities: Vec<String> = store.identities().map(str::to_string).collect();
    let mut added = 0;
    for identity in &identities {
        match store.inject_annotation(document, identity, ProblemMask::ALL) {
            Ok(n) => added += n,
            Err(e) => warn!("Not annotating: {e}"),
        }
    }
    added
}

/// Write every group to the sink, each under a `## <group>` heading
///
/// # Errors
///
/// Returns any error of the sink.
pub fn write_reports<W: Write>(store: &mut DiagnosticsStore, sink: &mut W) -> io::Result<()> {
    for (group, mask) in REPORT_GROUPS {
        if store.count(mask) == 0 {
            continue;
        }
        writeln!(sink, "## {group}")?;
        store.report(mask, sink, true)?;
    }
    Ok(())
}

fn write_report_files(store: &mut DiagnosticsStore, dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create report directory {}", dir.display()))?;
    for (group, mask) in REPORT_GROUPS {
        let path = dir.join(format!("{group}.txt"));
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        store.report(mask, &mut writer, true)?;
        writer.flush()?;
    }
    Ok(())
}

fn print_text_summary(outcome: &QcOutcome, annotated: usize, removed: Option<&RemovalSummary>) {
    let stats = &outcome.stats;
    let store = &outcome.store;
    eprintln!(
        "{} sequences, {} genes, {} products, {} proteins",
        stats.sequences, stats.genes, stats.products, stats.proteins
    );
    for (group, mask) in REPORT_GROUPS {
        eprintln!("  {group:<12} {}", store.count(mask));
    }
    eprintln!("  RNA predictions absent from the annotation: {}", outcome.absent_rna_count);
    if annotated > 0 {
        eprintln!("Annotated {annotated} problems");
    }
    if let Some(r) = removed {
        eprintln!(
            "Removed {} proteins and {} features ({} unresolved)",
            r.proteins, r.features, r.unresolved
        );
    }
}

fn print_json_summary(
    outcome: &QcOutcome,
    candidates: &std::collections::BTreeSet<String>,
    annotated: usize,
    removed: Option<&RemovalSummary>,
) -> anyhow::Result<()> {
    let problems: BTreeMap<&str, usize> = ProblemKind::ALL
        .iter()
        .map(|&kind| (kind.label(), outcome.store.count_kind(kind)))
        .filter(|(_, count)| *count > 0)
        .collect();

    let mut json = serde_json::json!({
        "stats": &outcome.stats,
        "absent_rna_count": outcome.absent_rna_count,
        "problems": problems,
        "removal_candidates": candidates,
        "annotated": annotated,
    });
    if let Some(r) = removed {
        json["removed"] = serde_json::json!({
            "proteins": r.proteins,
            "features": r.features,
            "unresolved": r.unresolved,
        });
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
