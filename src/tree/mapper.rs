//! Path mapper: logical source entries to absolute destination paths.
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use super::{EntryKind, LogicalEntry, PlannedEntry};
use crate::config::RunConfig;
use crate::logging::Log;

/// Lexically normalize `path`: drop `.` segments and resolve `..` against
/// the preceding segment.  `..` never climbs above the root of an absolute
/// path.  The filesystem is not consulted.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Strip `extension` from the file name of `dest`, if present and if
/// something remains.  Returns whether the suffix was stripped.
fn strip_template_suffix(dest: &mut PathBuf, extension: &str) -> bool {
    if extension.is_empty() {
        return false;
    }
    let stripped = dest
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_suffix(extension))
        .filter(|stem| !stem.is_empty())
        .map(str::to_string);
    match stripped {
        Some(stem) => {
            dest.set_file_name(stem);
            true
        }
        None => false,
    }
}

/// Map every logical entry to a planned entry under `config.dest`.
///
/// Ownership and mode come from the run configuration, by kind.  When two
/// entries map to the same destination path the first one is kept and the
/// later one is skipped with a warning.
pub fn map_entries(
    entries: Vec<LogicalEntry>,
    config: &RunConfig,
    log: &dyn Log,
) -> Vec<PlannedEntry> {
    let mut seen = HashSet::new();
    let mut planned = Vec::with_capacity(entries.len());

    for entry in entries {
        let mut dest = config.dest.clone();
        if let Some(group) = entry.grouping() {
            dest.push(group);
        }
        dest.push(&entry.relative);
        let mut dest = normalize(&dest);

        let (is_template, attributes) = match entry.kind {
            EntryKind::File => {
                let is_template = strip_template_suffix(&mut dest, &config.template_extension);
                if let Some(source) = &entry.source {
                    log.debug(&format!(
                        "MAP_FILE: '{} -> {}'",
                        source.display(),
                        dest.display()
                    ));
                }
                (is_template, config.file_attributes())
            }
            EntryKind::Directory => {
                log.debug(&format!("REMOTE_DIR: '{}'", dest.display()));
                (false, config.directory_attributes())
            }
        };

        if !seen.insert(dest.clone()) {
            log.warn(&format!(
                "Skipping duplicate destination {} from '{}'",
                dest.display(),
                entry.root
            ));
            continue;
        }

        planned.push(PlannedEntry {
            dest,
            kind: entry.kind,
            source: entry.source,
            attributes,
            is_template,
            content: None,
        });
    }
    planned
}
