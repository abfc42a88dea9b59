//! Transitive `#include` discovery.
//!
//! Walks the textual include graph rooted at a shader source and collects every
//! file whose content can affect the compiled output. Traversal uses an explicit
//! worklist and a visited set keyed by normalized path, so cyclic includes
//! terminate and deep include chains do not grow the call stack.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::path::normalize_path;
use crate::source_file::contains_bytes;

/// The directive that introduces an include line.
const INCLUDE_DIRECTIVE: &str = "#include";

/// Error raised when the root of an include closure cannot be read.
///
/// Failures on included files are never errors: missing targets are skipped
/// and unreadable ones stay in the closure without being descended into.
#[derive(Debug, thiserror::Error)]
#[error("cannot read shader source {path}: {source}")]
pub struct ResolveError {
    /// The root path that could not be read.
    pub path: PathBuf,
    /// The underlying I/O error.
    pub source: std::io::Error,
}

/// The set of files transitively reachable from a root source via includes.
///
/// Always contains the root. Paths are normalized, and iteration yields them
/// in lexicographic order regardless of discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeClosure {
    files: BTreeSet<PathBuf>,
}

impl IncludeClosure {
    /// Iterates over every file in the closure in sorted order.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    /// Returns `true` if the closure contains the given path (normalized first).
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(&normalize_path(path))
    }

    /// Number of files in the closure, root included.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Always `false`: a closure contains at least its root.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns `true` if any file in the closure contains `marker`.
    ///
    /// A file that cannot be read counts as containing the marker.
    pub fn any_file_contains(&self, marker: &str) -> bool {
        self.files().any(|file| match std::fs::read(file) {
            Ok(bytes) => contains_bytes(&bytes, marker.as_bytes()),
            Err(e) => {
                log::warn!("cannot scan {} for `{marker}`: {e}", file.display());
                true
            }
        })
    }
}

/// Extracts the quoted targets of every `#include "..."` line in `text`.
///
/// Lines whose include has no complete quoted argument (for example
/// `#include <foo>` or a missing closing quote) are skipped.
pub fn include_targets(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter_map(|line| {
        let rest = line.trim_start().strip_prefix(INCLUDE_DIRECTIVE)?;
        let start = rest.find('"')? + 1;
        let len = rest[start..].find('"')?;
        let target = &rest[start..start + len];
        (!target.is_empty()).then_some(target)
    })
}

/// Resolves the include closure of `root`.
///
/// Each include target is resolved relative to the directory of the file that
/// names it. Targets that do not exist on disk are skipped silently; a file
/// already visited is never processed twice.
///
/// # Errors
///
/// Returns [`ResolveError`] only if the root itself cannot be read.
pub fn resolve_includes(root: &Path) -> Result<IncludeClosure, ResolveError> {
    let root = normalize_path(root);
    let root_bytes = std::fs::read(&root).map_err(|e| ResolveError {
        path: root.clone(),
        source: e,
    })?;

    let mut files = BTreeSet::new();
    files.insert(root.clone());
    let mut pending = vec![(root, root_bytes)];

    while let Some((file, bytes)) = pending.pop() {
        let dir = file.parent().unwrap_or_else(|| Path::new(""));
        let text = String::from_utf8_lossy(&bytes);
        for target in include_targets(&text) {
            let resolved = normalize_path(&dir.join(target));
            if files.contains(&resolved) {
                continue;
            }
            if !resolved.is_file() {
                log::debug!(
                    "{}: include \"{target}\" not found, skipping",
                    file.display()
                );
                continue;
            }
            files.insert(resolved.clone());
            match std::fs::read(&resolved) {
                Ok(content) => pending.push((resolved, content)),
                Err(e) => log::warn!("cannot read include {}: {e}", resolved.display()),
            }
        }
    }

    Ok(IncludeClosure { files })
}
