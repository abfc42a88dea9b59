//! The persisted mapping from compiled artifact to last-recorded fingerprint.
//!
//! The cache is serialized as a flat JSON object keyed by artifact path relative
//! to the target root, with `/` as the only separator, so lookups are stable
//! across platforms and across invocations from different working directories.
//! Entries are written only after a successful compile and are never removed
//! automatically; entries for deleted artifacts persist harmlessly.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shaderbake_common::Fingerprint;
use shaderbake_source::{normalize_path, relative_key};

use crate::error::CacheError;

/// Artifact key → fingerprint recorded after the artifact's last successful compile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildCache {
    entries: BTreeMap<String, Fingerprint>,
}

impl BuildCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a cache from its JSON representation.
    pub fn from_json(content: &str) -> Result<Self, CacheError> {
        serde_json::from_str(content).map_err(|e| CacheError::Parse {
            reason: e.to_string(),
        })
    }

    /// Serializes the cache as pretty-printed JSON with sorted keys.
    pub fn to_json(&self) -> Result<String, CacheError> {
        serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })
    }

    /// Returns the fingerprint recorded for an artifact key.
    pub fn get(&self, key: &str) -> Option<Fingerprint> {
        self.entries.get(key).copied()
    }

    /// Records the fingerprint for an artifact key, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, fingerprint: Fingerprint) {
        self.entries.insert(key.into(), fingerprint);
    }

    /// Returns `true` if the recorded fingerprint for `key` equals `current`.
    pub fn is_up_to_date(&self, key: &str, current: Fingerprint) -> bool {
        self.get(key) == Some(current)
    }

    /// Number of recorded artifacts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Computes the cache key for an artifact path.
///
/// The key is the artifact's path relative to `target_root` with `/`
/// separators. An artifact outside the target root falls back to its full
/// normalized path, still with `/` separators.
pub fn artifact_key(artifact: &Path, target_root: &Path) -> String {
    relative_key(artifact, target_root).unwrap_or_else(|| {
        normalize_path(artifact)
            .to_string_lossy()
            .replace('\\', "/")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn new_cache_is_empty() {
        let cache = BuildCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn insert_and_lookup() {
        let mut cache = BuildCache::new();
        let fp = Fingerprint::from_bytes(b"a.vert");
        cache.insert("a.vert.spv", fp);

        assert_eq!(cache.get("a.vert.spv"), Some(fp));
        assert!(cache.is_up_to_date("a.vert.spv", fp));
        assert!(!cache.is_up_to_date("a.vert.spv", Fingerprint::from_bytes(b"other")));
        assert!(!cache.is_up_to_date("b.frag.spv", fp));
    }

    #[test]
    fn insert_replaces_previous() {
        let mut cache = BuildCache::new();
        cache.insert("a.vert.spv", Fingerprint::from_bytes(b"old"));
        cache.insert("a.vert.spv", Fingerprint::from_bytes(b"new"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a.vert.spv"), Some(Fingerprint::from_bytes(b"new")));
    }

    #[test]
    fn json_is_flat_object() {
        let mut cache = BuildCache::new();
        let fp = Fingerprint::from_bytes(b"x");
        cache.insert("pbr/lit.frag.spv", fp);

        let json = cache.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["pbr/lit.frag.spv"], serde_json::Value::String(fp.to_string()));
    }

    #[test]
    fn json_keys_are_sorted() {
        let mut cache = BuildCache::new();
        cache.insert("z.frag.spv", Fingerprint::from_bytes(b"z"));
        cache.insert("a.vert.spv", Fingerprint::from_bytes(b"a"));
        let json = cache.to_json().unwrap();
        assert!(json.find("a.vert.spv").unwrap() < json.find("z.frag.spv").unwrap());
    }

    #[test]
    fn from_json_reads_saved_output() {
        let mut cache = BuildCache::new();
        cache.insert("a.vert.spv", Fingerprint::from_bytes(b"a"));
        let back = BuildCache::from_json(&cache.to_json().unwrap()).unwrap();
        assert_eq!(back, cache);
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(matches!(
            BuildCache::from_json("not valid json {{{"),
            Err(CacheError::Parse { .. })
        ));
        assert!(BuildCache::from_json("{\"a.spv\": \"not-a-digest\"}").is_err());
    }

    #[test]
    fn artifact_key_is_relative_with_forward_slashes() {
        let root = PathBuf::from("/proj/assets/shaders");
        let artifact = root.join("pbr").join("lit.frag.spv");
        assert_eq!(artifact_key(&artifact, &root), "pbr/lit.frag.spv");
    }

    #[test]
    fn artifact_key_ignores_dot_segments() {
        let root = PathBuf::from("/proj/assets/shaders");
        let artifact = PathBuf::from("/proj/assets/./shaders/x/../a.vert.spv");
        assert_eq!(artifact_key(&artifact, &root), "a.vert.spv");
    }

    #[test]
    fn artifact_key_outside_root_falls_back() {
        let key = artifact_key(Path::new("/elsewhere/a.spv"), Path::new("/proj/out"));
        assert_eq!(key, "/elsewhere/a.spv");
    }
}
