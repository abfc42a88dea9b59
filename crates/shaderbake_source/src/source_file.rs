//! Shader source files loaded from disk.

use std::io;
use std::path::{Path, PathBuf};

use crate::stage::{detect_stage, ShaderStage};

/// A shader source file read into memory.
///
/// The content is kept as raw bytes; shader sources are expected to be text
/// but nothing here requires valid UTF-8.
pub struct ShaderSource {
    /// The filesystem path of this file.
    pub path: PathBuf,
    /// The stage kind derived from the file extension.
    pub stage: ShaderStage,
    /// The raw file content.
    pub content: Vec<u8>,
}

impl ShaderSource {
    /// Loads a shader source from disk.
    ///
    /// Returns `Ok(None)` if the extension is not a recognized shader stage.
    pub fn load(path: &Path) -> io::Result<Option<Self>> {
        let Some(stage) = detect_stage(path) else {
            return Ok(None);
        };
        let content = std::fs::read(path)?;
        Ok(Some(Self {
            path: path.to_path_buf(),
            stage,
            content,
        }))
    }

    /// Returns `true` if the content contains the given entry-point marker.
    ///
    /// Files without an entry point are shared include-only sources and are
    /// not compiled on their own.
    pub fn has_entry_point(&self, marker: &str) -> bool {
        contains_bytes(&self.content, marker.as_bytes())
    }
}

/// Returns `true` if `needle` occurs anywhere in `haystack`.
pub(crate) fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}
