//! Typed error variants for resource operations.
//!
//! Resource code returns these through [`anyhow::Error`] so that callers keep
//! a single error type while tests can still match on the variant with
//! `downcast_ref`.

use thiserror::Error;

/// Errors that arise from resource checks and apply operations.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// An owner or group name is not known to the account database.
    #[error("unknown {kind} '{name}'")]
    UnknownAccount {
        /// `"user"` or `"group"`.
        kind: &'static str,
        /// Name that failed to resolve.
        name: String,
    },

    /// The resource cannot be applied in the current state of the filesystem.
    #[error("invalid state for '{resource}': {reason}")]
    InvalidState {
        /// Path or description of the resource.
        resource: String,
        /// Human-readable explanation of why the state is invalid.
        reason: String,
    },
}
