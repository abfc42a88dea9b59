//! Lexical path normalization shared by the resolver and the cache.

use std::path::{Component, Path, PathBuf};

/// Removes `.` components and folds `..` into the preceding component.
///
/// Purely lexical: the filesystem is not consulted and symlinks are not
/// followed. A leading `..` that cannot be folded is kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Returns `path` relative to `root` with `/` as the only separator.
///
/// Both paths are normalized first. Returns `None` if `path` is not inside
/// `root` or contains a non-UTF-8 component.
pub fn relative_key(path: &Path, root: &Path) -> Option<String> {
    let path = normalize_path(path);
    let root = normalize_path(root);
    let rel = path.strip_prefix(&root).ok()?;
    let parts = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}
