//! Ownership and permission bits for destination objects.
use anyhow::{Context as _, Result};
use std::path::Path;

use super::error::ResourceError;
use crate::exec::Executor;

/// Resolved ownership and permissions to enforce on one path.
///
/// `None` fields are left as they are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ownership {
    /// Owning user id.
    pub uid: Option<u32>,
    /// Owning group id.
    pub gid: Option<u32>,
    /// Permission bits (`0o7777` range).
    pub mode: Option<u32>,
}

impl Ownership {
    /// Describe the first attribute of `meta` that differs from the desired
    /// ownership, or `None` if everything matches.
    #[must_use]
    pub fn mismatch(&self, meta: &std::fs::Metadata) -> Option<String> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            if let Some(mode) = self.mode {
                let current = meta.mode() & 0o7777;
                if current != mode {
                    return Some(format!("mode {current:04o}"));
                }
            }
            if let Some(uid) = self.uid
                && meta.uid() != uid
            {
                return Some(format!("owner {}", meta.uid()));
            }
            if let Some(gid) = self.gid
                && meta.gid() != gid
            {
                return Some(format!("group {}", meta.gid()));
            }
            None
        }

        #[cfg(not(unix))]
        {
            let _ = meta;
            None
        }
    }

    /// Enforce ownership and permissions on `path`.
    ///
    /// Ownership is changed before permissions so that set-id bits survive.
    ///
    /// # Errors
    ///
    /// Returns an error if `chown` or `chmod` fails.
    pub fn apply(&self, path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if self.uid.is_some() || self.gid.is_some() {
                std::os::unix::fs::chown(path, self.uid, self.gid)
                    .with_context(|| format!("chown {}", path.display()))?;
            }
            if let Some(mode) = self.mode {
                std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
                    .with_context(|| format!("chmod {mode:04o} {}", path.display()))?;
            }
        }

        #[cfg(not(unix))]
        {
            let _ = path;
        }
        Ok(())
    }
}

/// Resolve a user name or numeric id to a uid.
///
/// # Errors
///
/// Returns an error if the name is unknown to the account database.
pub fn resolve_user(executor: &dyn Executor, name: &str) -> Result<u32> {
    if let Ok(uid) = name.parse::<u32>() {
        return Ok(uid);
    }
    let result = executor
        .run("id", &["-u", name])
        .map_err(|_| ResourceError::UnknownAccount {
            kind: "user",
            name: name.to_string(),
        })?;
    result
        .stdout
        .trim()
        .parse::<u32>()
        .with_context(|| format!("unexpected uid for user '{name}': {}", result.stdout.trim()))
}

/// Resolve a group name or numeric id to a gid.
///
/// # Errors
///
/// Returns an error if the name is unknown to the account database.
pub fn resolve_group(executor: &dyn Executor, name: &str) -> Result<u32> {
    if let Ok(gid) = name.parse::<u32>() {
        return Ok(gid);
    }
    let result = executor.run_unchecked("getent", &["group", name])?;
    if !result.success {
        return Err(ResourceError::UnknownAccount {
            kind: "group",
            name: name.to_string(),
        }
        .into());
    }
    // name:password:gid:members
    result
        .stdout
        .trim()
        .split(':')
        .nth(2)
        .and_then(|gid| gid.parse::<u32>().ok())
        .with_context(|| format!("unexpected group entry for '{name}': {}", result.stdout.trim()))
}
