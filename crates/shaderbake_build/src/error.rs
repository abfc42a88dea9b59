//! Error types for setup problems that abort a build.
//!
//! Per-task problems never appear here; they are reported as failed tasks.

use std::path::PathBuf;

/// Errors that prevent a build from starting.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The shader source root does not exist or is not a directory.
    #[error("shader source directory {0} does not exist")]
    SourceRootMissing(PathBuf),
}
