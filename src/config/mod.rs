//! Run configuration: TOML file, command-line overrides, and validation.
//!
//! A run is described by a [`RawConfig`] (as parsed, loosely typed) which
//! [`RunConfig::from_raw`] validates and resolves into the strongly typed
//! form the engine consumes.  Validation happens before the destination is
//! listed or touched.
pub mod paths;
pub mod toml_loader;

pub use toml_loader::{RawConfig, load_config, parse_config};

use std::path::{Path, PathBuf};

use crate::error::TreeError;
use crate::logging::Log;
use crate::operations::{Attributes, Mode};
use crate::tree::mapper::normalize;

/// Default suffix marking template sources.
pub const DEFAULT_TEMPLATE_EXTENSION: &str = ".j2";

/// One declared source root and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot {
    /// Path as declared; a trailing separator means "copy contents".
    pub declared: String,
    /// Location used for reading.
    pub resolved: PathBuf,
}

/// Validated configuration for one reconciliation run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Source roots in priority order.
    pub sources: Vec<SourceRoot>,
    /// Absolute, normalized destination root.
    pub dest: PathBuf,
    /// Owner for every created entry.
    pub owner: Option<String>,
    /// Group for every created entry.
    pub group: Option<String>,
    /// Mode for files.
    pub file_mode: Option<Mode>,
    /// Mode for directories.
    pub directory_mode: Option<Mode>,
    /// Delete destination entries with no source counterpart.
    pub exclusive: bool,
    /// Paths exempt from deletion, relative to `dest` or absolute inside it.
    pub exclusive_ignore: Vec<PathBuf>,
    /// Suffix marking template sources; empty disables templating.
    pub template_extension: String,
    /// Template variable context (a JSON object).
    pub vars: serde_json::Value,
}

impl RunConfig {
    /// A configuration with no sources and every option at its default.
    #[must_use]
    pub fn new(dest: PathBuf) -> Self {
        Self {
            sources: Vec::new(),
            dest,
            owner: None,
            group: None,
            file_mode: None,
            directory_mode: None,
            exclusive: false,
            exclusive_ignore: Vec::new(),
            template_extension: DEFAULT_TEMPLATE_EXTENSION.to_string(),
            vars: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Validate `raw` and resolve its sources.
    ///
    /// Relative sources are resolved against `raw.base_dir`, itself relative
    /// to `base_dir` when not absolute.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidArgument`] if `src` or `dest` is missing,
    /// a path list or mode has the wrong type, or `vars` cannot be converted.
    pub fn from_raw(raw: RawConfig, base_dir: &Path, log: &dyn Log) -> Result<Self, TreeError> {
        let declared = match &raw.src {
            Some(value) => paths::parse_path_list("src", value)?,
            None => Vec::new(),
        };
        if declared.is_empty() {
            return Err(TreeError::invalid("missing required argument 'src'"));
        }
        let dest = raw
            .dest
            .filter(|d| !d.is_empty())
            .ok_or_else(|| TreeError::invalid("missing required argument 'dest'"))?;
        let dest = std::path::absolute(&dest)
            .map_err(|e| TreeError::invalid(format!("invalid destination '{dest}': {e}")))?;

        let exclusive_ignore = match &raw.exclusive_ignore {
            Some(value) => paths::parse_path_list("exclusive_ignore", value)?
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            None => Vec::new(),
        };
        let file_mode = raw
            .file_mode
            .as_ref()
            .map(|v| paths::parse_mode("file_mode", v))
            .transpose()?;
        let directory_mode = raw
            .directory_mode
            .as_ref()
            .map(|v| paths::parse_mode("directory_mode", v))
            .transpose()?;
        let vars = serde_json::to_value(&raw.vars)
            .map_err(|e| TreeError::invalid(format!("invalid template variables: {e}")))?;

        let base_dir = raw
            .base_dir
            .map_or_else(|| base_dir.to_path_buf(), |b| base_dir.join(b));
        let sources = declared
            .into_iter()
            .map(|d| resolve_source(d, &base_dir, log))
            .collect();

        Ok(Self {
            sources,
            dest: normalize(&dest),
            owner: raw.owner,
            group: raw.group,
            file_mode,
            directory_mode,
            exclusive: raw.exclusive.unwrap_or(false),
            exclusive_ignore,
            template_extension: raw
                .template_extension
                .unwrap_or_else(|| DEFAULT_TEMPLATE_EXTENSION.to_string()),
            vars,
        })
    }

    /// Attributes applied to every file.
    #[must_use]
    pub fn file_attributes(&self) -> Attributes {
        Attributes {
            owner: self.owner.clone(),
            group: self.group.clone(),
            mode: self.file_mode,
        }
    }

    /// Attributes applied to every directory.
    #[must_use]
    pub fn directory_attributes(&self) -> Attributes {
        Attributes {
            owner: self.owner.clone(),
            group: self.group.clone(),
            mode: self.directory_mode,
        }
    }
}

/// Find a declared source: `<base>/files/<src>`, then `<base>/<src>`, then
/// `<src>` as given.  Absolute sources are used as-is.
///
/// A source found nowhere resolves to `<base>/<src>`; the merger reports
/// it as unavailable.
fn resolve_source(declared: String, base_dir: &Path, log: &dyn Log) -> SourceRoot {
    let path = Path::new(&declared);
    let found = if path.is_absolute() {
        path.to_path_buf()
    } else {
        [
            base_dir.join("files").join(path),
            base_dir.join(path),
            path.to_path_buf(),
        ]
        .into_iter()
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| base_dir.join(path))
    };
    let resolved = dunce::canonicalize(&found).unwrap_or(found);
    log.debug(&format!(
        "RESOLVE_SRC: '{declared}' -> '{}'",
        resolved.display()
    ));
    SourceRoot { declared, resolved }
}
