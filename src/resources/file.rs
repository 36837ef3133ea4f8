//! Regular file resource.
use anyhow::{Context as _, Result};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use super::helpers::fs::{blocking_ancestor, ensure_parent_dir, lstat, object_kind, remove_any};
use super::{Applicable, Ownership, Resource, ResourceChange, ResourceState};

/// A regular file with fixed content, ownership and permissions.
#[derive(Debug, Clone)]
pub struct FileResource {
    /// Destination path.
    pub target: PathBuf,
    /// Desired content.
    pub content: Vec<u8>,
    /// Desired ownership and permissions.
    pub ownership: Ownership,
}

impl FileResource {
    /// Create a new file resource.
    #[must_use]
    pub const fn new(target: PathBuf, content: Vec<u8>, ownership: Ownership) -> Self {
        Self {
            target,
            content,
            ownership,
        }
    }

    /// Hex SHA-256 of the desired content.
    #[must_use]
    pub fn checksum(&self) -> String {
        sha256_hex(&self.content)
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .target
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        self.target.with_file_name(format!(".{name}.template-tree.tmp"))
    }
}

/// Hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

impl Applicable for FileResource {
    fn description(&self) -> String {
        format!("file {}", self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        if let Some(meta) = lstat(&self.target)?
            && !meta.is_file()
        {
            remove_any(&self.target)?;
        }
        ensure_parent_dir(&self.target)?;

        // Stage next to the target so the rename stays on one filesystem.
        let tmp = self.temp_path();
        let staged = std::fs::write(&tmp, &self.content)
            .with_context(|| format!("write {}", tmp.display()))
            .and_then(|()| self.ownership.apply(&tmp))
            .and_then(|()| {
                std::fs::rename(&tmp, &self.target).with_context(|| {
                    format!("rename {} to {}", tmp.display(), self.target.display())
                })
            });
        if staged.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        staged?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for FileResource {
    fn current_state(&self) -> Result<ResourceState> {
        let Some(meta) = lstat(&self.target)? else {
            if let Some(ancestor) = blocking_ancestor(&self.target) {
                return Ok(ResourceState::Invalid {
                    reason: format!("parent {} is not a directory", ancestor.display()),
                });
            }
            return Ok(ResourceState::Missing);
        };
        if !meta.is_file() {
            return Ok(ResourceState::Incorrect {
                current: object_kind(&meta).to_string(),
            });
        }

        let existing = std::fs::read(&self.target)
            .with_context(|| format!("read {}", self.target.display()))?;
        if sha256_hex(&existing) != self.checksum() {
            return Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            });
        }
        Ok(self
            .ownership
            .mismatch(&meta)
            .map_or(ResourceState::Correct, |current| ResourceState::Incorrect { current }))
    }
}
