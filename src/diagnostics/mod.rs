//! Diagnostics produced by the analysis.
//!
//! - [`Problem`]: one diagnostic, of exactly one [`ProblemKind`]
//! - [`ProblemMask`]: a set of kinds, used to query and report groups
//! - [`DiagnosticsStore`]: problems keyed by record identity, with filtered
//!   reporting, annotation injection and removal-candidate collection
//! - [`removal::apply_removals`]: deletes removal candidates from the document

pub mod problem;
pub mod removal;
pub mod store;

pub use problem::{Problem, ProblemKind, ProblemMask, ProblemSpan, Severity};
pub use store::DiagnosticsStore;
