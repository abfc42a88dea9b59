//! Errors raised while reading `shaderbake.toml` or the variant file.

use std::path::PathBuf;

/// A problem with one of the two configuration inputs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `shaderbake.toml` or the variant file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// `shaderbake.toml` is not valid TOML or a value has the wrong type.
    #[error("invalid tool configuration: {0}")]
    Toml(String),

    /// A setting that must name a path, program or marker was left blank.
    #[error("`{0}` must not be empty")]
    EmptySetting(&'static str),
}
