//! Resource describing a path that must not exist.
use anyhow::Result;
use std::path::PathBuf;

use super::helpers::fs::{lstat, object_kind, remove_any};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A destination path that must be removed, recursively for directories.
#[derive(Debug, Clone)]
pub struct AbsentResource {
    /// Path to remove.
    pub target: PathBuf,
}

impl AbsentResource {
    /// Create a new absent resource.
    #[must_use]
    pub const fn new(target: PathBuf) -> Self {
        Self { target }
    }
}

impl Applicable for AbsentResource {
    fn description(&self) -> String {
        format!("absent {}", self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        // A parent removed earlier in the same run may already have taken it.
        if remove_any(&self.target)? {
            Ok(ResourceChange::Applied)
        } else {
            Ok(ResourceChange::AlreadyCorrect)
        }
    }
}

impl Resource for AbsentResource {
    fn current_state(&self) -> Result<ResourceState> {
        Ok(lstat(&self.target)?.map_or(ResourceState::Correct, |meta| {
            ResourceState::Incorrect {
                current: object_kind(&meta).to_string(),
            }
        }))
    }
}
