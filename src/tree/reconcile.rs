//! Reconciler: decides which destination objects to delete.
//!
//! Every planned entry is (re)applied unconditionally, so the interesting
//! half of the plan is the delete set.  A destination object is deleted when
//!
//! - a planned entry has the same path but a different kind, or
//! - exclusive mode is on, no planned entry has its path, and it is not equal
//!   to or nested under an ignore path.
//!
//! Decisions are independent per object: a directory may be deleted even
//! though a kept entry lives below it.  Removal tolerates targets that an
//! earlier removal already took away.
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::mapper::normalize;
use super::{EntryKind, PlannedEntry};
use crate::error::TreeError;
use crate::logging::Log;
use crate::operations::{PathState, RemoteEntry};

/// Deletes followed by creates, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    /// Destination objects to remove, in listing order.
    pub to_delete: Vec<RemoteEntry>,
    /// Entries to create or update, in source order.
    pub to_create: Vec<PlannedEntry>,
}

impl fmt::Display for ReconciliationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let deletes = self
            .to_delete
            .iter()
            .map(|r| format!("delete {} ({})", r.path.display(), r.state()));
        let creates = self
            .to_create
            .iter()
            .map(|p| format!("create {} {}", p.kind, p.dest.display()));
        let lines: Vec<String> = deletes.chain(creates).collect();
        f.write_str(&lines.join("\n"))
    }
}

/// Destination-relative subtrees exempt from exclusive-mode deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    paths: Vec<PathBuf>,
}

impl IgnoreSet {
    /// Validate `ignores` against `dest`.
    ///
    /// Absolute paths must lie inside `dest` and are made relative to it.
    /// Relative paths may not climb out of `dest`.  `.` ignores everything.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidArgument`] for a path outside `dest`.
    pub fn new(dest: &Path, ignores: &[PathBuf]) -> Result<Self, TreeError> {
        let paths = ignores
            .iter()
            .map(|ignore| {
                let normalized = normalize(ignore);
                let relative = if normalized.is_absolute() {
                    normalized.strip_prefix(dest).map(Path::to_path_buf).map_err(|_| {
                        TreeError::invalid(format!(
                            "exclusive_ignore path '{}' is not inside '{}'",
                            ignore.display(),
                            dest.display()
                        ))
                    })?
                } else {
                    normalized
                };
                if relative.starts_with("..") {
                    return Err(TreeError::invalid(format!(
                        "exclusive_ignore path '{}' escapes '{}'",
                        ignore.display(),
                        dest.display()
                    )));
                }
                Ok(relative)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { paths })
    }

    /// The first ignore path that `relative` equals or is nested under.
    #[must_use]
    pub fn covering(&self, relative: &Path) -> Option<&Path> {
        self.paths
            .iter()
            .map(PathBuf::as_path)
            .find(|ignore| relative.starts_with(ignore))
    }
}

const fn kind_matches(kind: EntryKind, remote: &RemoteEntry) -> bool {
    match kind {
        EntryKind::File => remote.is_regular_file && !remote.is_dir,
        EntryKind::Directory => remote.is_dir,
    }
}

fn shown(relative: &Path) -> String {
    if relative.as_os_str().is_empty() {
        ".".to_string()
    } else {
        relative.display().to_string()
    }
}

/// Compare the planned entries with the destination listing.
///
/// Objects outside `dest` are skipped with a warning; a correct lister never
/// reports them.
#[must_use]
pub fn compute_plan(
    planned: Vec<PlannedEntry>,
    remote: Vec<RemoteEntry>,
    dest: &Path,
    exclusive: bool,
    ignores: &IgnoreSet,
    log: &dyn Log,
) -> ReconciliationPlan {
    let to_delete = {
        let by_dest: HashMap<&Path, EntryKind> = planned
            .iter()
            .map(|p| (p.dest.as_path(), p.kind))
            .collect();

        let mut to_delete = Vec::new();
        for entry in remote {
            let path = normalize(&entry.path);
            let Ok(relative) = path.strip_prefix(dest) else {
                log.warn(&format!(
                    "Skipping {} outside destination {}",
                    entry.path.display(),
                    dest.display()
                ));
                continue;
            };
            let rel = shown(relative);

            let delete = match by_dest.get(path.as_path()) {
                Some(&kind) if kind_matches(kind, &entry) => {
                    log.debug(&format!("COMPARE: keep '{rel}' (present in source)"));
                    false
                }
                Some(&kind) => {
                    let remote_state = match entry.state() {
                        PathState::Directory => "directory",
                        PathState::File => "file",
                        PathState::Absent | PathState::Other => "other",
                    };
                    log.debug(&format!(
                        "COMPARE: delete '{rel}' (destination is {remote_state}, source is {kind})"
                    ));
                    true
                }
                None if !exclusive => {
                    log.debug(&format!("COMPARE: keep '{rel}' (exclusive mode disabled)"));
                    false
                }
                None => match ignores.covering(relative) {
                    Some(ignore) => {
                        log.debug(&format!(
                            "COMPARE: keep '{rel}' (child of ignored path '{}')",
                            shown(ignore)
                        ));
                        false
                    }
                    None => {
                        log.debug(&format!("COMPARE: delete '{rel}' (absent in source)"));
                        true
                    }
                },
            };
            if delete {
                to_delete.push(entry);
            }
        }
        to_delete
    };

    ReconciliationPlan {
        to_delete,
        to_create: planned,
    }
}
