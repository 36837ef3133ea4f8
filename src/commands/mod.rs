//! Top-level subcommand orchestration.
pub mod apply;
pub mod version;
