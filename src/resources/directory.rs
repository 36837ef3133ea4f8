//! Directory resource.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::helpers::fs::{
    blocking_ancestor, is_dir_or_link_to_dir, lstat, object_kind, remove_any,
};
use super::{Applicable, Ownership, Resource, ResourceChange, ResourceState};

/// A directory with fixed ownership and permissions.
#[derive(Debug, Clone)]
pub struct DirectoryResource {
    /// Destination path.
    pub target: PathBuf,
    /// Desired ownership and permissions.
    pub ownership: Ownership,
}

impl DirectoryResource {
    /// Create a new directory resource.
    #[must_use]
    pub const fn new(target: PathBuf, ownership: Ownership) -> Self {
        Self { target, ownership }
    }
}

impl Applicable for DirectoryResource {
    fn description(&self) -> String {
        format!("directory {}", self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        if let Some(meta) = lstat(&self.target)?
            && !is_dir_or_link_to_dir(&self.target, &meta)
        {
            remove_any(&self.target)?;
        }
        std::fs::create_dir_all(&self.target)
            .with_context(|| format!("create directory {}", self.target.display()))?;
        self.ownership.apply(&self.target)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for DirectoryResource {
    fn current_state(&self) -> Result<ResourceState> {
        let Some(meta) = lstat(&self.target)? else {
            if let Some(ancestor) = blocking_ancestor(&self.target) {
                return Ok(ResourceState::Invalid {
                    reason: format!("parent {} is not a directory", ancestor.display()),
                });
            }
            return Ok(ResourceState::Missing);
        };
        if !is_dir_or_link_to_dir(&self.target, &meta) {
            return Ok(ResourceState::Incorrect {
                current: object_kind(&meta).to_string(),
            });
        }
        let meta = std::fs::metadata(&self.target)
            .with_context(|| format!("stat {}", self.target.display()))?;
        Ok(self
            .ownership
            .mismatch(&meta)
            .map_or(ResourceState::Correct, |current| ResourceState::Incorrect { current }))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_then_created() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b");
        let r = DirectoryResource::new(target.clone(), Ownership::default());
        assert_eq!(r.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(r.apply().unwrap(), ResourceChange::Applied);
        assert!(target.is_dir());
        assert_eq!(r.current_state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn file_in_the_way_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("data");
        std::fs::write(&target, "not a dir").unwrap();
        let r = DirectoryResource::new(target.clone(), Ownership::default());
        assert_eq!(
            r.current_state().unwrap(),
            ResourceState::Incorrect {
                current: "file".to_string()
            }
        );
        r.apply().unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn file_parent_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let r = DirectoryResource::new(blocker.join("sub"), Ownership::default());
        assert!(matches!(
            r.current_state().unwrap(),
            ResourceState::Invalid { .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn mode_mismatch_is_incorrect() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("d");
        std::fs::create_dir(&target).unwrap();
        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o755)).unwrap();
        let r = DirectoryResource::new(
            target,
            Ownership {
                mode: Some(0o700),
                ..Ownership::default()
            },
        );
        assert_eq!(
            r.current_state().unwrap(),
            ResourceState::Incorrect {
                current: "mode 0755".to_string()
            }
        );
        r.apply().unwrap();
        assert_eq!(r.current_state().unwrap(), ResourceState::Correct);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_to_directory_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        std::fs::create_dir(&real).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let r = DirectoryResource::new(link.clone(), Ownership::default());
        assert_eq!(r.current_state().unwrap(), ResourceState::Correct);
        r.apply().unwrap();
        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    }
}
