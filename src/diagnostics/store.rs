use indexmap::IndexMap;
use std::collections::{BTreeSet, HashSet};
use std::io::{self, Write};
use tracing::{debug, warn};

use crate::core::document::{Document, Feature, Location};
use crate::core::error::QcError;
use crate::diagnostics::problem::{Problem, ProblemKind, ProblemMask, Severity};

/// Diagnostics of one analysis run, keyed by record identity.
///
/// Identities keep their first-recorded order, and problems keep insertion order
/// within an identity. Entries only leave the store through a draining `report`.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsStore {
    entries: IndexMap<String, Vec<Problem>>,
}

impl DiagnosticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a problem; never deduplicates
    pub fn record(&mut self, identity: impl Into<String>, problem: Problem) {
        self.entries
            .entry(identity.into())
            .or_default()
            .push(problem);
    }

    /// Does any problem stored under `identity` have a kind in `mask`?
    pub fn has(&self, identity: &str, mask: ProblemMask) -> bool {
        self.entries
            .get(identity)
            .is_some_and(|problems| problems.iter().any(|p| mask.contains(p.kind)))
    }

    /// `has` over every alias of a record
    pub fn has_any<S: AsRef<str>>(&self, identities: &[S], mask: ProblemMask) -> bool {
        identities.iter().any(|id| self.has(id.as_ref(), mask))
    }

    pub fn problems(&self, identity: &str) -> &[Problem] {
        self.entries.get(identity).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of identities with at least one problem
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of stored problems whose kind is in `mask`
    pub fn count(&self, mask: ProblemMask) -> usize {
        self.entries
            .values()
            .flatten()
            .filter(|p| mask.contains(p.kind))
            .count()
    }

    /// Number of stored problems of one kind
    pub fn count_kind(&self, kind: ProblemKind) -> usize {
        self.count(ProblemMask::from(kind))
    }

    /// Write every identity with matching problems as a bracketed header followed by
    /// one line per matching problem. With `drain`, the reported problems are removed.
    ///
    /// Returns the number of identities written.
    ///
    /// # Errors
    ///
    /// Returns any error of the underlying writer.
    pub fn report<W: Write>(
        &mut self,
        mask: ProblemMask,
        sink: &mut W,
        drain: bool,
    ) -> io::Result<usize> {
        let mut written = 0;
        for (identity, problems) in &self.entries {
            let mut matching = problems.iter().filter(|p| mask.contains(p.kind)).peekable();
            if matching.peek().is_none() {
                continue;
            }
            writeln!(sink, "[{identity}]")?;
            for problem in matching {
                let label = match problem.severity() {
                    Severity::Warning => format!("warning: {}", problem.kind.label()),
                    Severity::Finding => problem.kind.label().to_string(),
                };
                if problem.report.is_empty() {
                    writeln!(sink, "\t{label}")?;
                } else {
                    writeln!(sink, "\t{label}\t{}", problem.report)?;
                }
            }
            written += 1;
        }

        if drain {
            for problems in self.entries.values_mut() {
                problems.retain(|p| !mask.contains(p.kind));
            }
            self.entries.retain(|_, problems| !problems.is_empty());
        }
        Ok(written)
    }

    /// Add one `misc_feature` per distinct problem kind in `mask` that carries an
    /// annotation message, to the first feature table of the nucleotide record
    /// owning `identity`. Returns the number of features added.
    ///
    /// A record without feature tables is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `QcError::UnknownIdentity` when no nucleotide record owns the identity.
    pub fn inject_annotation(
        &self,
        document: &mut Document,
        identity: &str,
        mask: ProblemMask,
    ) -> Result<usize, QcError> {
        let Some(problems) = self.entries.get(identity) else {
            return Ok(0);
        };
        let seq_index = document
            .owning_nucleotide(identity)
            .ok_or_else(|| QcError::UnknownIdentity(identity.to_string()))?;
        if document.sequences[seq_index].feature_tables.is_empty() {
            warn!(
                "{} has no feature table; not annotating {identity}",
                document.sequences[seq_index].id
            );
            return Ok(0);
        }

        let mut injected: HashSet<ProblemKind> = HashSet::new();
        for problem in problems.iter().filter(|p| mask.contains(p.kind)) {
            let Some(message) = problem
                .annotation_message
                .as_deref()
                .filter(|m| !m.is_empty())
            else {
                continue;
            };
            let Some(span) = problem.span else {
                debug!("{} problem on {identity} has no position", problem.kind);
                continue;
            };
            if injected.contains(&problem.kind) {
                continue;
            }
            let location = Location::interval(span.from, span.to, span.strand);
            if document.append_feature(seq_index, Feature::misc(location, message)) {
                injected.insert(problem.kind);
            }
        }
        Ok(injected.len())
    }

    /// Identities carrying a problem that calls for removing the record
    pub fn collect_removal_candidates(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .filter(|(_, problems)| {
                problems
                    .iter()
                    .any(|p| ProblemMask::REMOVAL.contains(p.kind))
            })
            .map(|(identity, _)| identity.clone())
            .collect()
    }
}
