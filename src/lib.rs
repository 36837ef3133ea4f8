//! Template tree reconciler.
//!
//! Makes a destination directory mirror one or more source trees: files are
//! copied or rendered from templates, directories are created, and in
//! exclusive mode anything at the destination that no source provides is
//! deleted.  Runs are idempotent, and a check mode reports the changes a
//! run would make without applying them.
//!
//! The public API is organised into these layers:
//!
//! - **[`config`]**: parse and validate the TOML run file and its overrides
//! - **[`tree`]**: the engine: merge, map, resolve, reconcile, execute
//! - **[`operations`]**: collaborator traits and their local implementations
//! - **[`resources`]**: idempotent `check + apply` primitives (file, directory, absent)
//! - **[`commands`]**: top-level subcommand orchestration (`apply`, `version`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod operations;
pub mod resources;
pub mod tree;
