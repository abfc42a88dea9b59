//! Error types for cache operations.

use std::path::PathBuf;

use shaderbake_source::ResolveError;

/// Errors that can occur during cache operations.
///
/// Most cache operations are fail-safe: errors result in a rebuild rather
/// than a hard failure. This enum is used for propagation inside the cache
/// subsystem and for reporting why a fingerprint could not be computed.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing a file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The include closure of a shader could not be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The cache file could not be parsed.
    #[error("failed to parse build cache: {reason}")]
    Parse {
        /// Description of the parse failure.
        reason: String,
    },

    /// The cache could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}
