//! Domain-specific error types for the reconciliation engine.
//!
//! Internal modules return [`TreeError`] while command handlers at the CLI
//! boundary convert it to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error taxonomy
//!
//! ```text
//! TreeError
//! ├── InvalidArgument    : missing src/dest, malformed path lists or modes
//! ├── ContentUnavailable : a source file cannot be located, read, or rendered
//! └── OperationFailed    : a listing, delete, or create/update step failed
//! ```
//!
//! Every variant is terminal for the run. No variant is raised after a
//! partial success is reported as success.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a reconciliation run.
#[derive(Error, Debug)]
pub enum TreeError {
    /// Run configuration is missing or malformed. Raised before any mutation.
    #[error("{0}")]
    InvalidArgument(String),

    /// A declared source file could not be read or rendered.
    #[error("could not resolve content of {}: {reason}", path.display())]
    ContentUnavailable {
        /// Source file that could not be resolved.
        path: PathBuf,
        /// Human-readable reason, including the underlying error chain.
        reason: String,
    },

    /// A collaborator reported a failure while listing, deleting, or writing.
    ///
    /// The message is the collaborator's own, surfaced verbatim.
    #[error("{message}")]
    OperationFailed {
        /// Destination path the failing operation targeted.
        path: PathBuf,
        /// Collaborator message.
        message: String,
    },
}

impl TreeError {
    /// Shorthand for [`TreeError::InvalidArgument`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Build an [`TreeError::OperationFailed`] from a collaborator error,
    /// keeping its full context chain.
    pub fn operation(path: impl Into<PathBuf>, err: &anyhow::Error) -> Self {
        Self::OperationFailed {
            path: path.into(),
            message: format!("{err:#}"),
        }
    }

    /// Build a [`TreeError::ContentUnavailable`] from a collaborator error.
    pub fn content(path: impl Into<PathBuf>, err: &anyhow::Error) -> Self {
        Self::ContentUnavailable {
            path: path.into(),
            reason: format!("{err:#}"),
        }
    }
}
