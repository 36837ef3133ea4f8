//! Log file location and timestamps.
use std::fs;
use std::path::PathBuf;

/// Environment variable that overrides the log directory.
pub(super) const LOG_DIR_ENV: &str = "TEMPLATE_TREE_LOG_DIR";

/// Directory for run logs: `$TEMPLATE_TREE_LOG_DIR`, else
/// `$XDG_CACHE_HOME/template-tree`, else `~/.cache/template-tree`, else the
/// system temp directory.  Created if missing.
fn log_dir() -> Option<PathBuf> {
    let dir = if let Some(dir) = std::env::var_os(LOG_DIR_ENV) {
        PathBuf::from(dir)
    } else {
        std::env::var_os("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))
            .unwrap_or_else(std::env::temp_dir)
            .join("template-tree")
    };
    fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Log file for `command`, one per command, overwritten on every run.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    Some(log_dir()?.join(format!("{command}.log")))
}

/// Current UTC time in RFC 3339 with second precision.
pub(super) fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
