//! Parsing and validation of shaderbake configuration.
//!
//! Two files are read here: the tool configuration `shaderbake.toml`, which
//! fixes the source root, target root, cache location and compiler settings,
//! and the line-oriented variant file that declares extra named artifacts
//! built with explicit macro sets.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;
pub mod variants;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{resolve_paths, ResolvedPaths};
pub use types::*;
pub use variants::{load_variants, parse_variants, VariantSpec};
