//! Local filesystem destination.
//!
//! Implements listing, writing and removal against the machine the process
//! runs on.  Every write goes through an idempotent resource, so an object
//! that already matches is reported with `changed = false` and left alone.
use anyhow::{Context as _, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use walkdir::WalkDir;

use super::{
    Attributes, DestinationLister, DiffRecord, Listing, OpResult, PathRemover, PathState,
    PathWriter, RemoteEntry,
};
use crate::exec::{Executor, SystemExecutor};
use crate::resources::error::ResourceError;
use crate::resources::helpers::fs::{is_dir_or_link_to_dir, lstat};
use crate::resources::ownership::{resolve_group, resolve_user};
use crate::resources::{
    AbsentResource, Applicable, DirectoryResource, FileResource, Ownership, Resource,
    ResourceChange, ResourceState,
};

/// Destination rooted on the local filesystem.
///
/// In check mode (`dry_run`) every operation reports what it would change
/// without touching the filesystem.
#[derive(Debug)]
pub struct LocalDestination {
    executor: Arc<dyn Executor>,
    dry_run: bool,
    accounts: Mutex<HashMap<String, u32>>,
}

impl LocalDestination {
    /// Create a destination that resolves account names with `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>, dry_run: bool) -> Self {
        Self {
            executor,
            dry_run,
            accounts: Mutex::new(HashMap::new()),
        }
    }

    /// Create a destination backed by the real process executor.
    #[must_use]
    pub fn system(dry_run: bool) -> Self {
        Self::new(Arc::new(SystemExecutor), dry_run)
    }

    /// Whether this destination is in check mode.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn lookup(&self, kind: &str, name: &str) -> Result<u32> {
        let key = format!("{kind}:{name}");
        if let Ok(cache) = self.accounts.lock()
            && let Some(id) = cache.get(&key)
        {
            return Ok(*id);
        }
        let id = if kind == "user" {
            resolve_user(self.executor.as_ref(), name)?
        } else {
            resolve_group(self.executor.as_ref(), name)?
        };
        if let Ok(mut cache) = self.accounts.lock() {
            cache.insert(key, id);
        }
        Ok(id)
    }

    fn ownership(&self, attributes: &Attributes) -> Result<Ownership> {
        Ok(Ownership {
            uid: attributes
                .owner
                .as_deref()
                .map(|name| self.lookup("user", name))
                .transpose()?,
            gid: attributes
                .group
                .as_deref()
                .map(|name| self.lookup("group", name))
                .transpose()?,
            mode: attributes.mode.map(super::Mode::bits),
        })
    }

    /// Apply `resource` unless in check mode.
    fn converge(&self, resource: &dyn Applicable) -> Result<ResourceChange> {
        if self.dry_run {
            return Ok(ResourceChange::Applied);
        }
        resource
            .apply()
            .with_context(|| format!("apply {}", resource.description()))
    }

    /// Check-mode tolerance: an earlier delete that was only simulated may
    /// leave a blocking parent in place.
    fn reject_invalid(&self, path: &Path, reason: String) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        Err(ResourceError::InvalidState {
            resource: path.display().to_string(),
            reason,
        }
        .into())
    }
}

/// Observed state of `path` plus its text content when it is a UTF-8 file.
fn observe(path: &Path) -> Result<(PathState, Option<String>)> {
    let Some(meta) = lstat(path)? else {
        return Ok((PathState::Absent, None));
    };
    let ty = meta.file_type();
    if ty.is_dir() {
        Ok((PathState::Directory, None))
    } else if ty.is_file() {
        let text = std::fs::read(path)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok());
        Ok((PathState::File, text))
    } else {
        Ok((PathState::Other, None))
    }
}

impl DestinationLister for LocalDestination {
    fn list(&self, root: &Path) -> Result<Listing> {
        let mut listing = Listing::default();
        let Some(meta) = lstat(root)? else {
            return Ok(listing);
        };
        if !is_dir_or_link_to_dir(root, &meta) {
            let ty = meta.file_type();
            listing.entries.push(RemoteEntry {
                path: root.to_path_buf(),
                is_dir: false,
                is_regular_file: ty.is_file(),
            });
            return Ok(listing);
        }

        for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
            match entry {
                Ok(entry) => {
                    let ty = entry.file_type();
                    listing.entries.push(RemoteEntry {
                        path: entry.into_path(),
                        is_dir: ty.is_dir(),
                        is_regular_file: ty.is_file(),
                    });
                }
                Err(err) if err.depth() == 0 => {
                    return Err(err).with_context(|| format!("list {}", root.display()));
                }
                Err(err) => listing.warnings.push(err.to_string()),
            }
        }
        Ok(listing)
    }
}

impl PathWriter for LocalDestination {
    fn write_file(
        &self,
        path: &Path,
        content: &[u8],
        attributes: &Attributes,
    ) -> Result<OpResult> {
        let resource = FileResource::new(
            path.to_path_buf(),
            content.to_vec(),
            self.ownership(attributes)?,
        );
        let checksum = resource.checksum();
        match resource.current_state()? {
            ResourceState::Correct => {
                return Ok(OpResult::unchanged(path, PathState::File).with_checksum(checksum));
            }
            ResourceState::Invalid { reason } => self.reject_invalid(path, reason)?,
            ResourceState::Missing | ResourceState::Incorrect { .. } => {}
        }

        let (before_state, before) = observe(path)?;
        let after = String::from_utf8(content.to_vec()).ok();
        let diff = if before_state == PathState::File && before == after {
            DiffRecord::state_change(path, PathState::File, PathState::File)
        } else {
            DiffRecord {
                path: path.to_path_buf(),
                before_state,
                after_state: PathState::File,
                before,
                after,
            }
        };
        self.converge(&resource)?;
        Ok(OpResult::changed(path, PathState::File, diff).with_checksum(checksum))
    }

    fn ensure_directory(&self, path: &Path, attributes: &Attributes) -> Result<OpResult> {
        let resource = DirectoryResource::new(path.to_path_buf(), self.ownership(attributes)?);
        match resource.current_state()? {
            ResourceState::Correct => {
                return Ok(OpResult::unchanged(path, PathState::Directory));
            }
            ResourceState::Invalid { reason } => self.reject_invalid(path, reason)?,
            ResourceState::Missing | ResourceState::Incorrect { .. } => {}
        }

        let (before_state, _) = observe(path)?;
        self.converge(&resource)?;
        Ok(OpResult::changed(
            path,
            PathState::Directory,
            DiffRecord::state_change(path, before_state, PathState::Directory),
        ))
    }
}

impl PathRemover for LocalDestination {
    fn remove(&self, path: &Path) -> Result<OpResult> {
        let resource = AbsentResource::new(path.to_path_buf());
        if !resource.needs_change()? {
            return Ok(OpResult::unchanged(path, PathState::Absent));
        }
        let (before_state, _) = observe(path)?;
        match self.converge(&resource)? {
            ResourceChange::AlreadyCorrect => Ok(OpResult::unchanged(path, PathState::Absent)),
            ResourceChange::Applied => Ok(OpResult::changed(
                path,
                PathState::Absent,
                DiffRecord::state_change(path, before_state, PathState::Absent),
            )),
        }
    }
}
