//! Shared helpers used by resource implementations.
pub mod fs;
