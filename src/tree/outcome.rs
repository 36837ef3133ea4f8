//! Result aggregator: folds operation results into one outcome record.
use serde::Serialize;

use crate::operations::{DiffRecord, OpResult, PathState};

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Whether any operation changed (or in check mode would change) the destination.
    pub changed: bool,
    /// Results of operations that left a path absent.
    pub deleted_entries: Vec<OpResult>,
    /// Results of operations that left a path a directory.
    pub managed_directories: Vec<OpResult>,
    /// Results of operations that left a path a regular file.
    pub managed_files: Vec<OpResult>,
    /// Every diff record, in operation order.
    pub diff: Vec<DiffRecord>,
}

impl Outcome {
    /// Fold results, in execution order.
    #[must_use]
    pub fn fold(results: impl IntoIterator<Item = OpResult>) -> Self {
        results.into_iter().fold(Self::default(), |mut outcome, result| {
            outcome.changed |= result.changed;
            outcome.diff.extend(result.diff.iter().cloned());
            match result.state {
                PathState::Absent => outcome.deleted_entries.push(result),
                PathState::Directory => outcome.managed_directories.push(result),
                PathState::File => outcome.managed_files.push(result),
                PathState::Other => {}
            }
            outcome
        })
    }

    /// One-line human summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let count = |results: &[OpResult]| results.iter().filter(|r| r.changed).count();
        format!(
            "{}: {} deleted, {}/{} directories, {}/{} files changed",
            if self.changed { "changed" } else { "ok" },
            count(&self.deleted_entries),
            count(&self.managed_directories),
            self.managed_directories.len(),
            count(&self.managed_files),
            self.managed_files.len(),
        )
    }

    /// All diff records rendered as unified diffs.
    #[must_use]
    pub fn unified_diff(&self) -> String {
        self.diff.iter().map(DiffRecord::unified).collect()
    }
}
