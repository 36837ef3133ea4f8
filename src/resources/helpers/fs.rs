//! File-system resource helpers.
use anyhow::{Context as _, Result};
use std::fs::Metadata;
use std::path::{Path, PathBuf};

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Metadata of `path` without following a final symlink, or `None` if
/// nothing exists there (including when an ancestor is not a directory).
///
/// # Errors
///
/// Returns an error for any other failure.
pub fn lstat(path: &Path) -> Result<Option<Metadata>> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if is_absent(&e) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("stat {}", path.display())),
    }
}

fn is_absent(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
    )
}

/// Whether `meta` (from [`lstat`]) describes a directory, or a symlink
/// at `path` that resolves to one.
#[must_use]
pub fn is_dir_or_link_to_dir(path: &Path, meta: &Metadata) -> bool {
    meta.is_dir()
        || (meta.file_type().is_symlink()
            && std::fs::metadata(path).is_ok_and(|target| target.is_dir()))
}

/// Short name for the kind of object described by `meta`.
#[must_use]
pub fn object_kind(meta: &Metadata) -> &'static str {
    let ty = meta.file_type();
    if ty.is_dir() {
        "directory"
    } else if ty.is_file() {
        "file"
    } else {
        "other"
    }
}

/// Closest existing ancestor of `path` that is not a directory.
///
/// Such an ancestor makes it impossible to create `path` without first
/// removing it.  Symlinks to directories count as directories here.
#[must_use]
pub fn blocking_ancestor(path: &Path) -> Option<PathBuf> {
    path.ancestors()
        .skip(1)
        .find_map(|ancestor| match std::fs::metadata(ancestor) {
            Ok(meta) if meta.is_dir() => Some(None),
            Ok(_) => Some(Some(ancestor.to_path_buf())),
            Err(_) => None,
        })
        .flatten()
}

/// Remove whatever occupies `path`: directories recursively, anything else
/// as a single file.  Returns `false` if nothing was there.
///
/// # Errors
///
/// Returns an error if the object exists but cannot be removed.
pub fn remove_any(path: &Path) -> Result<bool> {
    let Some(meta) = lstat(path)? else {
        return Ok(false);
    };
    let removed = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    match removed {
        Ok(()) => Ok(true),
        Err(e) if is_absent(&e) => Ok(false),
        Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
    }
}
