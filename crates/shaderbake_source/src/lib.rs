//! Shader source files and their textual include graph.
//!
//! This crate knows which file extensions name shader stages, how to load a
//! shader source from disk, and how to discover the transitive set of files a
//! shader pulls in through `#include "..."` directives.

#![warn(missing_docs)]

pub mod include;
pub mod path;
pub mod source_file;
pub mod stage;

pub use include::{include_targets, resolve_includes, IncludeClosure, ResolveError};
pub use path::{normalize_path, relative_key};
pub use source_file::ShaderSource;
pub use stage::{detect_stage, ShaderStage};
