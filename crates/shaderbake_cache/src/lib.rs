//! Incremental shader build cache.
//!
//! This crate computes content fingerprints over a shader's include closure
//! and persists the last fingerprint recorded for every compiled artifact, so
//! unchanged shaders can be skipped on the next build.

#![warn(missing_docs)]

pub mod error;
pub mod fingerprint;
pub mod manifest;
pub mod store;

pub use error::CacheError;
pub use fingerprint::SourceFingerprinter;
pub use manifest::{artifact_key, BuildCache};
pub use store::{CacheStore, JsonFileStore, MemoryStore};
