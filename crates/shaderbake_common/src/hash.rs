//! Content fingerprints for cache invalidation.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use xxhash_rust::xxh3::Xxh3;

/// A 128-bit content digest computed using XXH3.
///
/// Two inputs with the same `Fingerprint` are assumed to be identical. The
/// build cache stores one fingerprint per compiled artifact and compares it
/// against a freshly computed one to decide whether recompilation is needed.
///
/// Serialized as a 32-character lowercase hex string so the cache file stays
/// human-readable and diffable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    /// Computes a fingerprint from a single byte slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }
}

/// Incremental digest over several inputs fed in order.
///
/// Feeding `a` then `b` yields the same fingerprint as [`Fingerprint::from_bytes`]
/// over the concatenation of `a` and `b`.
pub struct FingerprintBuilder {
    state: Xxh3,
}

impl FingerprintBuilder {
    /// Creates a builder with an empty input.
    pub fn new() -> Self {
        Self { state: Xxh3::new() }
    }

    /// Appends bytes to the digest input.
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    /// Finalizes the digest.
    pub fn finish(&self) -> Fingerprint {
        Fingerprint(self.state.digest128().to_le_bytes())
    }
}

impl Default for FingerprintBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// Error returned when a string is not a valid 32-digit hex fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid fingerprint '{0}': expected 32 hex digits")]
pub struct ParseFingerprintError(pub String);

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFingerprintError(s.to_string());
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| err())?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
