//! Collaborator interfaces consumed by the reconciliation engine.
//!
//! The engine never touches the destination or the source content directly.
//! It calls through the narrow traits defined here so that listing, reading,
//! rendering, writing and removing can be swapped for tests or for other
//! transports.  Production code uses [`LocalDestination`],
//! [`FsContentReader`] and [`HandlebarsRenderer`].

mod local;
#[cfg(test)]
pub mod memory;
mod template;

pub use local::LocalDestination;
pub use template::{FsContentReader, HandlebarsRenderer};

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Serialize, Serializer};

/// Permission bits applied to a created file or directory.
///
/// # Examples
///
/// ```
/// use template_tree::operations::Mode;
///
/// let mode = Mode::from_octal("0644").unwrap();
/// assert_eq!(mode.bits(), 0o644);
/// assert_eq!(mode.to_string(), "0644");
/// assert!(Mode::from_octal("0999").is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mode(u32);

impl Mode {
    /// Highest accepted value (`0o7777`).
    pub const MAX: u32 = 0o7777;

    /// Build a mode from raw permission bits, rejecting values above `0o7777`.
    #[must_use]
    pub const fn new(bits: u32) -> Option<Self> {
        if bits > Self::MAX {
            None
        } else {
            Some(Self(bits))
        }
    }

    /// Parse an octal string such as `"644"`, `"0644"` or `"0o644"`.
    #[must_use]
    pub fn from_octal(s: &str) -> Option<Self> {
        let digits = s.trim();
        let digits = digits.strip_prefix("0o").unwrap_or(digits);
        if digits.is_empty() {
            return None;
        }
        u32::from_str_radix(digits, 8).ok().and_then(Self::new)
    }

    /// Raw permission bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ownership and permissions applied uniformly to every entry of one kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attributes {
    /// Owning user, by name or numeric id.
    pub owner: Option<String>,
    /// Owning group, by name or numeric id.
    pub group: Option<String>,
    /// Permission bits.
    pub mode: Option<Mode>,
}

/// Observed or desired state of a destination path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathState {
    /// Nothing exists at the path.
    Absent,
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// A symlink, device, socket or other special object.
    Other,
}

impl fmt::Display for PathState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Absent => "absent",
            Self::File => "file",
            Self::Directory => "directory",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// Before/after record for one changed destination path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffRecord {
    /// Destination path the record describes.
    pub path: PathBuf,
    /// State before the operation.
    pub before_state: PathState,
    /// State after the operation.
    pub after_state: PathState,
    /// Previous text content, when the path was a UTF-8 regular file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// New text content, when the path becomes a UTF-8 regular file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl DiffRecord {
    /// Record a state transition without content.
    #[must_use]
    pub fn state_change(path: &Path, before_state: PathState, after_state: PathState) -> Self {
        Self {
            path: path.to_path_buf(),
            before_state,
            after_state,
            before: None,
            after: None,
        }
    }

    /// Render the record as a unified diff.
    ///
    /// Text content is diffed line by line; pure state transitions are
    /// rendered as a single `state:` line on each side.
    #[must_use]
    pub fn unified(&self) -> String {
        let path = self.path.display();
        let before_header = format!("{path} ({})", self.before_state);
        let after_header = format!("{path} ({})", self.after_state);
        if self.before.is_none() && self.after.is_none() {
            return format!(
                "--- {before_header}\n+++ {after_header}\n-state: {}\n+state: {}\n",
                self.before_state, self.after_state
            );
        }
        let before = self.before.as_deref().unwrap_or("");
        let after = self.after.as_deref().unwrap_or("");
        similar::TextDiff::from_lines(before, after)
            .unified_diff()
            .header(&before_header, &after_header)
            .to_string()
    }
}

/// Result reported by a write, directory or remove operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpResult {
    /// Destination path the operation targeted.
    pub path: PathBuf,
    /// State of the path after the operation.
    pub state: PathState,
    /// Whether the destination was (or in check mode would be) modified.
    pub changed: bool,
    /// SHA-256 of the desired file content, for file writes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Diff records describing the change.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diff: Vec<DiffRecord>,
}

impl OpResult {
    /// A result that left the destination untouched.
    #[must_use]
    pub fn unchanged(path: &Path, state: PathState) -> Self {
        Self {
            path: path.to_path_buf(),
            state,
            changed: false,
            checksum: None,
            diff: Vec::new(),
        }
    }

    /// A result that modified the destination, described by `diff`.
    #[must_use]
    pub fn changed(path: &Path, state: PathState, diff: DiffRecord) -> Self {
        Self {
            path: path.to_path_buf(),
            state,
            changed: true,
            checksum: None,
            diff: vec![diff],
        }
    }

    /// Attach the content checksum.
    #[must_use]
    pub fn with_checksum(mut self, checksum: String) -> Self {
        self.checksum = Some(checksum);
        self
    }
}

/// One filesystem object found under the destination root.
///
/// Both flags `false` means the object is neither a directory nor a regular
/// file (symlink, device, socket, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteEntry {
    /// Absolute path under the destination root.
    pub path: PathBuf,
    /// The object is a directory.
    pub is_dir: bool,
    /// The object is a regular file.
    pub is_regular_file: bool,
}

impl RemoteEntry {
    /// A directory entry.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
            is_regular_file: false,
        }
    }

    /// A regular file entry.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
            is_regular_file: true,
        }
    }

    /// A special object (symlink, device, ...).
    pub fn other(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
            is_regular_file: false,
        }
    }

    /// Derived state; `is_dir` takes precedence if a lister sets both flags.
    #[must_use]
    pub const fn state(&self) -> PathState {
        if self.is_dir {
            PathState::Directory
        } else if self.is_regular_file {
            PathState::File
        } else {
            PathState::Other
        }
    }
}

/// Output of [`DestinationLister::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Every object found under the root, recursively, hidden entries included.
    pub entries: Vec<RemoteEntry>,
    /// Partial-traversal warnings; they never affect the decision logic.
    pub warnings: Vec<String>,
}

/// Enumerates the current state of the destination tree.
pub trait DestinationLister: Send + Sync {
    /// List every object under `root`. A missing root yields an empty listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the root exists but cannot be traversed at all.
    fn list(&self, root: &Path) -> Result<Listing>;
}

/// Loads the raw bytes of a plain source file.
pub trait ContentReader: Send + Sync {
    /// Read `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be located or read.
    fn read(&self, source: &Path) -> Result<Vec<u8>>;
}

/// Renders a template source file with a variable context.
pub trait ContentRenderer: Send + Sync {
    /// Render `source` with `vars`.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be read, parsed, or rendered.
    fn render(&self, source: &Path, vars: &serde_json::Value) -> Result<String>;
}

/// Creates or updates files and directories at the destination.
#[cfg_attr(test, mockall::automock)]
pub trait PathWriter: Send + Sync {
    /// Write `content` to `path` with the given attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or its attributes set.
    fn write_file(&self, path: &Path, content: &[u8], attributes: &Attributes)
    -> Result<OpResult>;

    /// Make sure `path` is a directory with the given attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or its attributes set.
    fn ensure_directory(&self, path: &Path, attributes: &Attributes) -> Result<OpResult>;
}

/// Removes objects from the destination.
#[cfg_attr(test, mockall::automock)]
pub trait PathRemover: Send + Sync {
    /// Remove `path` (recursively for directories).
    ///
    /// A target that is already absent is a success with `changed = false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the object exists but cannot be removed.
    fn remove(&self, path: &Path) -> Result<OpResult>;
}
