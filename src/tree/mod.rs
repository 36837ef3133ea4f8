//! The reconciliation engine.
//!
//! A run flows through these stages, each in its own module:
//!
//! ```text
//! merge ──► mapper ──► content ──► reconcile ◄── destination listing
//!                                      │
//!                                      ▼
//!                                  executor ──► outcome
//! ```
//!
//! Everything up to [`plan`] is free of side effects on the destination;
//! [`reconcile`] additionally applies the plan and folds the results.

pub mod content;
pub mod context;
pub mod executor;
pub mod mapper;
pub mod merge;
pub mod outcome;
pub mod reconcile;

pub use context::Context;
pub use executor::execute;
pub use outcome::Outcome;
pub use reconcile::{IgnoreSet, ReconciliationPlan};

use std::path::PathBuf;

use crate::config::RunConfig;
use crate::error::TreeError;
use crate::operations::Attributes;

/// Kind of object a source entry produces at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Directory => "directory",
        })
    }
}

/// One path discovered while walking a source root, before mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalEntry {
    /// Source root as declared; a trailing separator means "copy contents".
    pub root: String,
    /// Path relative to the root (empty for the root itself).
    pub relative: PathBuf,
    /// File or directory.
    pub kind: EntryKind,
    /// Resolved source file; always set for files.
    pub source: Option<PathBuf>,
}

impl LogicalEntry {
    /// Whether the root copies its contents rather than itself.
    #[must_use]
    pub fn copies_contents(&self) -> bool {
        ends_with_separator(&self.root)
    }

    /// Destination segment contributed by the root: `None` for "copy
    /// contents" roots, the root's last declared segment otherwise.
    ///
    /// A trailing `.` is kept so that mapping collapses it into the
    /// destination itself.  A trailing `..` contributes nothing, keeping
    /// entries inside the destination.
    #[must_use]
    pub fn grouping(&self) -> Option<String> {
        if self.copies_contents() {
            return None;
        }
        match self.root.rsplit(std::path::is_separator).next()? {
            "" | ".." => None,
            segment => Some(segment.to_string()),
        }
    }
}

/// Whether `s` ends with a path separator.
#[must_use]
pub fn ends_with_separator(s: &str) -> bool {
    s.chars().last().is_some_and(std::path::is_separator)
}

/// A mapped entry: the unit of creation at the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    /// Normalized absolute destination path.
    pub dest: PathBuf,
    /// File or directory.
    pub kind: EntryKind,
    /// Source file for file entries.
    pub source: Option<PathBuf>,
    /// Ownership and mode, uniform per kind within one run.
    pub attributes: Attributes,
    /// The source carried the template suffix, which was stripped from `dest`.
    pub is_template: bool,
    /// Final content; filled by [`content::resolve_contents`] for files only.
    pub content: Option<Vec<u8>>,
}

/// Compute the reconciliation plan without touching the destination.
///
/// # Errors
///
/// Returns [`TreeError::InvalidArgument`] for malformed ignore paths,
/// [`TreeError::ContentUnavailable`] if a source cannot be walked, read or
/// rendered, and [`TreeError::OperationFailed`] if the destination cannot be
/// listed.
pub fn plan(config: &RunConfig, ctx: &Context) -> Result<ReconciliationPlan, TreeError> {
    let log = ctx.log.as_ref();
    let ignores = IgnoreSet::new(&config.dest, &config.exclusive_ignore)?;

    log.stage("Collecting sources");
    let logical = merge::merge_sources(&config.sources, ctx.parallel, log)?;
    let planned = mapper::map_entries(logical, config, log);
    let planned = content::resolve_contents(planned, &config.vars, ctx)?;

    log.stage("Comparing destination");
    let listing = ctx
        .lister
        .list(&config.dest)
        .map_err(|e| TreeError::operation(&config.dest, &e))?;
    for warning in &listing.warnings {
        log.warn(warning);
    }

    Ok(reconcile::compute_plan(
        planned,
        listing.entries,
        &config.dest,
        config.exclusive,
        &ignores,
        log,
    ))
}

/// Plan, apply, and summarize one run.
///
/// # Errors
///
/// Returns any error from [`plan`], or [`TreeError::OperationFailed`] for the
/// first delete or create that fails.  Operations applied before the failure
/// stay applied.
pub fn reconcile(config: &RunConfig, ctx: &Context) -> Result<Outcome, TreeError> {
    let plan = plan(config, ctx)?;
    ctx.log.stage("Applying changes");
    let results = execute(&plan, ctx)?;
    Ok(Outcome::fold(results))
}
