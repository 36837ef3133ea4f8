//! In-memory destination used by engine tests.
use anyhow::{Result, bail};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{
    Attributes, DestinationLister, DiffRecord, Listing, OpResult, PathRemover, PathState,
    PathWriter, RemoteEntry,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Directory,
    File(Vec<u8>),
    Other,
}

impl Node {
    const fn state(&self) -> PathState {
        match self {
            Self::Directory => PathState::Directory,
            Self::File(_) => PathState::File,
            Self::Other => PathState::Other,
        }
    }
}

/// A destination tree held in a sorted map, recording every call made to it.
#[derive(Debug, Default)]
pub struct MemoryDestination {
    nodes: Mutex<BTreeMap<PathBuf, Node>>,
    calls: Mutex<Vec<String>>,
    fail_on: HashSet<PathBuf>,
    warnings: Vec<String>,
}

impl MemoryDestination {
    /// Empty destination.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a directory.
    #[must_use]
    pub fn with_dir(self, path: &str) -> Self {
        self.insert(path, Node::Directory);
        self
    }

    /// Seed a regular file.
    #[must_use]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.insert(path, Node::File(content.as_bytes().to_vec()));
        self
    }

    /// Seed a special object (symlink, device, ...).
    #[must_use]
    pub fn with_other(self, path: &str) -> Self {
        self.insert(path, Node::Other);
        self
    }

    /// Make every operation on `path` fail.
    #[must_use]
    pub fn failing_on(mut self, path: &str) -> Self {
        self.fail_on.insert(PathBuf::from(path));
        self
    }

    /// Attach a partial-traversal warning to every listing.
    #[must_use]
    pub fn with_warning(mut self, warning: &str) -> Self {
        self.warnings.push(warning.to_string());
        self
    }

    /// Calls made so far, as `"remove <path>"`, `"write <path>"` or `"mkdir <path>"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map_or_else(|_| Vec::new(), |c| c.clone())
    }

    /// Sorted snapshot of the tree as `"<path> (<kind>)"` lines.
    pub fn tree(&self) -> Vec<String> {
        self.nodes.lock().map_or_else(
            |_| Vec::new(),
            |nodes| {
                nodes
                    .iter()
                    .map(|(path, node)| format!("{} ({})", path.display(), node.state()))
                    .collect()
            },
        )
    }

    /// Content of the file at `path`, if any.
    pub fn content(&self, path: &str) -> Option<String> {
        let nodes = self.nodes.lock().ok()?;
        match nodes.get(Path::new(path)) {
            Some(Node::File(bytes)) => String::from_utf8(bytes.clone()).ok(),
            _ => None,
        }
    }

    fn insert(&self, path: &str, node: Node) {
        if let Ok(mut nodes) = self.nodes.lock() {
            nodes.insert(PathBuf::from(path), node);
        }
    }

    fn record(&self, op: &str, path: &Path) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{op} {}", path.display()));
        }
        if self.fail_on.contains(path) {
            bail!("simulated failure at {}", path.display());
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<PathBuf, Node>>> {
        self.nodes
            .lock()
            .map_err(|_| anyhow::anyhow!("memory destination poisoned"))
    }
}

impl DestinationLister for MemoryDestination {
    fn list(&self, root: &Path) -> Result<Listing> {
        let nodes = self.lock()?;
        let entries = nodes
            .iter()
            .filter(|(path, node)| {
                (path.starts_with(root) && path.as_path() != root)
                    || (path.as_path() == root && **node != Node::Directory)
            })
            .map(|(path, node)| match node {
                Node::Directory => RemoteEntry::directory(path.clone()),
                Node::File(_) => RemoteEntry::file(path.clone()),
                Node::Other => RemoteEntry::other(path.clone()),
            })
            .collect();
        Ok(Listing {
            entries,
            warnings: self.warnings.clone(),
        })
    }
}

impl PathWriter for MemoryDestination {
    fn write_file(&self, path: &Path, content: &[u8], _: &Attributes) -> Result<OpResult> {
        self.record("write", path)?;
        let mut nodes = self.lock()?;
        let before = nodes.get(path).cloned();
        if before.as_ref() == Some(&Node::File(content.to_vec())) {
            return Ok(OpResult::unchanged(path, PathState::File));
        }
        nodes.insert(path.to_path_buf(), Node::File(content.to_vec()));
        let before_state = before.as_ref().map_or(PathState::Absent, Node::state);
        Ok(OpResult::changed(
            path,
            PathState::File,
            DiffRecord::state_change(path, before_state, PathState::File),
        ))
    }

    fn ensure_directory(&self, path: &Path, _: &Attributes) -> Result<OpResult> {
        self.record("mkdir", path)?;
        let mut nodes = self.lock()?;
        let before = nodes.insert(path.to_path_buf(), Node::Directory);
        if before == Some(Node::Directory) {
            return Ok(OpResult::unchanged(path, PathState::Directory));
        }
        let before_state = before.as_ref().map_or(PathState::Absent, Node::state);
        Ok(OpResult::changed(
            path,
            PathState::Directory,
            DiffRecord::state_change(path, before_state, PathState::Directory),
        ))
    }
}

impl PathRemover for MemoryDestination {
    fn remove(&self, path: &Path) -> Result<OpResult> {
        self.record("remove", path)?;
        let mut nodes = self.lock()?;
        let Some(before) = nodes.remove(path) else {
            return Ok(OpResult::unchanged(path, PathState::Absent));
        };
        nodes.retain(|p, _| !p.starts_with(path));
        Ok(OpResult::changed(
            path,
            PathState::Absent,
            DiffRecord::state_change(path, before.state(), PathState::Absent),
        ))
    }
}
