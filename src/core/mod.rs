//! Core data types for annotation quality control.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Document`](document::Document): the in-memory annotated genome (nucleotide and
//!   protein records with feature tables)
//! - [`NormalizedRecord`](record::NormalizedRecord): the normalized view of a gene,
//!   CDS or RNA feature that every analysis works on
//! - [`ExternalRnaRecord`](record::ExternalRnaRecord): an RNA predicted by an
//!   external tool
//! - [`AlignmentHit`](hit::AlignmentHit): one homology-search hit of a protein
//! - [`ProteinAnnotation`](protein::ProteinAnnotation): a protein with its genomic span
//!
//! ## Coordinates
//!
//! Document and record coordinates are 0-based and inclusive on both ends. Alignment
//! hit ranges keep the 1-based convention of the search report.

pub mod document;
pub mod error;
pub mod hit;
pub mod protein;
pub mod record;
pub mod types;
