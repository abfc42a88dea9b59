//! Shared foundational types used across the shaderbake build tool.
//!
//! Currently this is the content fingerprint used as the cache key for
//! incremental shader compilation.

#![warn(missing_docs)]

pub mod hash;

pub use hash::{Fingerprint, FingerprintBuilder, ParseFingerprintError};
