//! Storage backends for the build cache.
//!
//! The orchestrator talks to a [`CacheStore`] rather than to the filesystem
//! directly, so the build logic can be exercised against [`MemoryStore`].

use std::path::{Path, PathBuf};

use crate::error::CacheError;
use crate::manifest::BuildCache;

/// Loads and saves a [`BuildCache`] wholesale.
pub trait CacheStore {
    /// Loads the cache.
    ///
    /// Fail-safe: a missing or unparsable cache yields an empty one, which
    /// makes every task rebuild.
    fn load(&self) -> BuildCache;

    /// Persists the full cache, replacing whatever was stored before.
    fn save(&mut self, cache: &BuildCache) -> Result<(), CacheError>;
}

/// A cache stored as a single JSON file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the file at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cache, reporting why it could not be read.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn try_load(&self) -> Result<Option<BuildCache>, CacheError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CacheError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        BuildCache::from_json(&content).map(Some)
    }

    /// Path of the temporary file written before the final rename.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CacheStore for JsonFileStore {
    fn load(&self) -> BuildCache {
        match self.try_load() {
            Ok(cache) => cache.unwrap_or_default(),
            Err(e) => {
                log::warn!("{e}; rebuilding everything");
                BuildCache::new()
            }
        }
    }

    /// Writes to a sibling temporary file and renames it over the cache file,
    /// creating the parent directory if needed.
    fn save(&mut self, cache: &BuildCache) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = cache.to_json()?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, json).map_err(|e| CacheError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| CacheError::Io {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// An in-memory cache store.
///
/// Keeps the most recently saved cache and counts saves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    cache: BuildCache,
    saves: usize,
}

impl MemoryStore {
    /// Creates a store whose first `load` returns `cache`.
    pub fn with_cache(cache: BuildCache) -> Self {
        Self { cache, saves: 0 }
    }

    /// Returns the currently stored cache.
    pub fn cache(&self) -> &BuildCache {
        &self.cache
    }

    /// Number of times [`CacheStore::save`] has been called.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl CacheStore for MemoryStore {
    fn load(&self) -> BuildCache {
        self.cache.clone()
    }

    fn save(&mut self, cache: &BuildCache) -> Result<(), CacheError> {
        self.cache = cache.clone();
        self.saves += 1;
        Ok(())
    }
}
