//! TOML run file parsing.
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Run configuration as written in a TOML file, before validation.
///
/// Path-list and mode values are kept as raw TOML values so that type
/// errors can be reported with the option name by [`super::paths`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Source roots: a string or a list of strings.
    pub src: Option<toml::Value>,
    /// Destination root.
    pub dest: Option<String>,
    /// Owner applied to every created entry.
    pub owner: Option<String>,
    /// Group applied to every created entry.
    pub group: Option<String>,
    /// Mode for files: octal string or integer.
    pub file_mode: Option<toml::Value>,
    /// Mode for directories: octal string or integer.
    pub directory_mode: Option<toml::Value>,
    /// Delete destination entries with no source counterpart.
    pub exclusive: Option<bool>,
    /// Paths exempt from deletion: a string or a list of strings.
    pub exclusive_ignore: Option<toml::Value>,
    /// Suffix marking template sources (default `.j2`).
    pub template_extension: Option<String>,
    /// Directory that relative sources are resolved against.
    pub base_dir: Option<PathBuf>,
    /// Template variable context.
    #[serde(default)]
    pub vars: toml::Table,
}

impl RawConfig {
    /// Layer `overrides` on top of `self`.
    ///
    /// Every option set in `overrides` replaces the one in `self`; `vars`
    /// tables are merged key by key.
    #[must_use]
    pub fn merge(mut self, overrides: Self) -> Self {
        self.src = overrides.src.or(self.src);
        self.dest = overrides.dest.or(self.dest);
        self.owner = overrides.owner.or(self.owner);
        self.group = overrides.group.or(self.group);
        self.file_mode = overrides.file_mode.or(self.file_mode);
        self.directory_mode = overrides.directory_mode.or(self.directory_mode);
        self.exclusive = overrides.exclusive.or(self.exclusive);
        self.exclusive_ignore = overrides.exclusive_ignore.or(self.exclusive_ignore);
        self.template_extension = overrides.template_extension.or(self.template_extension);
        self.base_dir = overrides.base_dir.or(self.base_dir);
        self.vars.extend(overrides.vars);
        self
    }
}

/// Parse a run file from a string.
///
/// # Errors
///
/// Returns an error if `content` is not valid TOML or contains unknown keys.
pub fn parse_config(content: &str) -> Result<RawConfig> {
    toml::from_str(content).context("Failed to parse TOML config")
}

/// Load a run file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<RawConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
}
