//! Source tree merger: walks every source root and unions the results.
use std::collections::HashSet;
use std::path::{MAIN_SEPARATOR, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use super::{EntryKind, LogicalEntry};
use crate::config::SourceRoot;
use crate::error::TreeError;
use crate::logging::{BufferedLog, Log};

/// Walk `roots` in order and merge them into one entry list.
///
/// Entries with the same root grouping and relative path are kept only from
/// the first root that produced them.  A directory is always emitted before
/// any of its descendants.  With `parallel`, roots are walked concurrently
/// and their log output is replayed in root order.
///
/// # Errors
///
/// Returns [`TreeError::ContentUnavailable`] if a root does not exist or a
/// directory cannot be traversed.
pub fn merge_sources(
    roots: &[SourceRoot],
    parallel: bool,
    log: &dyn Log,
) -> Result<Vec<LogicalEntry>, TreeError> {
    let walk = |root: &SourceRoot| {
        let buffer = BufferedLog::new();
        let entries = walk_root(root, &buffer);
        (entries, buffer)
    };
    let walked: Vec<_> = if parallel && roots.len() > 1 {
        roots.par_iter().map(walk).collect()
    } else {
        roots.iter().map(walk).collect()
    };

    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for (entries, buffer) in walked {
        buffer.flush_into(log);
        for entry in entries? {
            if seen.insert((entry.grouping(), entry.relative.clone())) {
                merged.push(entry);
            } else {
                log.debug(&format!(
                    "SHADOWED: '{}' from '{}'",
                    entry.relative.display(),
                    entry.root
                ));
            }
        }
    }
    Ok(merged)
}

/// Entries of a single root, parent before child.
fn walk_root(root: &SourceRoot, log: &dyn Log) -> Result<Vec<LogicalEntry>, TreeError> {
    let resolved = &root.resolved;
    let meta = std::fs::metadata(resolved).map_err(|e| TreeError::ContentUnavailable {
        path: resolved.clone(),
        reason: format!("could not find or access '{}': {e}", root.declared),
    })?;

    if meta.is_file() {
        let parent = resolved.parent().map(PathBuf::from).unwrap_or_default();
        let name = resolved.file_name().map(PathBuf::from).unwrap_or_default();
        return Ok(vec![LogicalEntry {
            root: format!("{}{MAIN_SEPARATOR}", parent.display()),
            relative: name,
            kind: EntryKind::File,
            source: Some(resolved.clone()),
        }]);
    }
    if !meta.is_dir() {
        log.warn(&format!(
            "Ignoring unrecognised local file type: {}",
            resolved.display()
        ));
        return Ok(Vec::new());
    }

    let mut entries = vec![LogicalEntry {
        root: root.declared.clone(),
        relative: PathBuf::new(),
        kind: EntryKind::Directory,
        source: None,
    }];
    let walker = WalkDir::new(resolved)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();
    for item in walker {
        let item = item.map_err(|e| TreeError::content(resolved, &anyhow::Error::new(e)))?;
        let Ok(relative) = item.path().strip_prefix(resolved) else {
            continue;
        };
        let ty = item.file_type();
        let (kind, source) = if ty.is_dir() {
            (EntryKind::Directory, None)
        } else if ty.is_file() {
            (EntryKind::File, Some(item.path().to_path_buf()))
        } else {
            log.warn(&format!(
                "Ignoring unrecognised local file type: {}",
                item.path().display()
            ));
            continue;
        };
        entries.push(LogicalEntry {
            root: root.declared.clone(),
            relative: relative.to_path_buf(),
            kind,
            source,
        });
    }
    Ok(entries)
}
