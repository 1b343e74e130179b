//! # annot-qc
//!
//! A library for quality control of draft genome annotations.
//!
//! Gene callers working on a fresh assembly get most genes right, but they also
//! split genes at sequencing errors, call proteins on top of tRNAs, miss RNAs or put
//! them on the wrong strand, and leave short or truncated fragments behind.
//!
//! `annot-qc` finds these defects by checking the annotation against independent
//! evidence: protein homology hits and external tRNA/rRNA predictions.
//!
//! ## Features
//!
//! - **Gene resolution**: Links genes to their CDS/RNA products by coordinates
//! - **Overlap detection**: CDS/CDS overlaps and RNA/CDS collisions, with a removal policy
//! - **Frameshift detection**: Adjacent proteins hitting complementary parts of one homolog
//! - **RNA reconciliation**: Missing, shifted or wrong-strand tRNAs and rRNAs
//! - **Protein checks**: Short proteins and truncated calls inside a contig
//! - **Actions**: Problems can be injected as features or trigger record removal
//!
//! ## Example
//!
//! ```rust,no_run
//! use annot_qc::{Document, QcEngine, ProblemMask};
//! use annot_qc::parsing::blast::parse_blast_file;
//! use std::path::Path;
//!
//! let mut document = Document::load_from_file(Path::new("genome.json")).unwrap();
//! document.attach_genomic_locations();
//! let hits = parse_blast_file(Path::new("proteins.blastp.tsv")).unwrap();
//!
//! let mut outcome = QcEngine::new(&document).run(&hits, &[], &[]).unwrap();
//! outcome
//!     .store
//!     .report(ProblemMask::FRAMESHIFTS, &mut std::io::stdout(), false)
//!     .unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Document model, normalized records, hits and proteins
//! - [`analysis`]: Overlap engine, resolver, classifiers and the pipeline
//! - [`diagnostics`]: Problems, the diagnostics store and the removal pass
//! - [`parsing`]: Parsers for BLAST, tRNAscan-SE and rRNA GFF files
//! - [`cli`]: Command-line interface implementation

pub mod analysis;
pub mod cli;
pub mod core;
pub mod diagnostics;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::analysis::engine::{QcEngine, QcOutcome, Thresholds};
pub use crate::core::document::Document;
pub use crate::core::error::QcError;
pub use crate::core::hit::{AlignmentHit, HitSource};
pub use crate::core::record::{ExternalRnaRecord, NormalizedRecord};
pub use crate::core::types::*;
pub use crate::diagnostics::{DiagnosticsStore, Problem, ProblemKind, ProblemMask};
