//! Annotation-consistency analysis.
//!
//! This module contains:
//! - Interval primitives and windowed searches over sorted records
//! - Gene-to-product resolution
//! - Overlap decisions (CDS/CDS and RNA/CDS)
//! - Frameshift classification of adjacent proteins
//! - Reconciliation with external RNA predictions
//! - The [`engine::QcEngine`] pipeline running all of the above

pub mod collision;
pub mod engine;
pub mod frameshift;
pub mod overlap;
pub mod protein_checks;
pub mod resolver;
pub mod rna;

pub use engine::{QcEngine, QcOutcome, RunStats, Thresholds};
