//! Content fingerprints over a shader's include closure.
//!
//! The fingerprint of a compile task covers the raw bytes of every file in the
//! root's include closure, fed in sorted path order, followed by the task's
//! macros. Any byte change anywhere in the closure, or any macro change,
//! produces a different fingerprint.

use std::path::Path;

use shaderbake_common::{Fingerprint, FingerprintBuilder};
use shaderbake_source::{resolve_includes, IncludeClosure};

use crate::error::CacheError;

/// Separator written after each macro so adjacent macros cannot merge.
const MACRO_SEPARATOR: u8 = 0;

/// Computes fingerprints for shader sources.
pub struct SourceFingerprinter;

impl SourceFingerprinter {
    /// Resolves the include closure of `root` and fingerprints it with `macros`.
    ///
    /// Any error means the task's state is unknown and it must be rebuilt.
    pub fn fingerprint<S: AsRef<str>>(
        root: &Path,
        macros: &[S],
    ) -> Result<Fingerprint, CacheError> {
        let closure = resolve_includes(root)?;
        Self::fingerprint_closure(&closure, macros)
    }

    /// Fingerprints an already-resolved include closure.
    ///
    /// Files are read in the closure's sorted order. A file that cannot be read
    /// fails the whole fingerprint rather than being skipped, so a temporarily
    /// unreadable dependency forces a rebuild instead of hiding a change.
    pub fn fingerprint_closure<S: AsRef<str>>(
        closure: &IncludeClosure,
        macros: &[S],
    ) -> Result<Fingerprint, CacheError> {
        let mut builder = FingerprintBuilder::new();
        for file in closure.files() {
            let bytes = std::fs::read(file).map_err(|e| CacheError::Io {
                path: file.to_path_buf(),
                source: e,
            })?;
            builder.update(&bytes);
        }

        let mut sorted: Vec<&str> = macros.iter().map(AsRef::as_ref).collect();
        sorted.sort_unstable();
        for m in sorted {
            builder.update(m.as_bytes());
            builder.update(&[MACRO_SEPARATOR]);
        }

        Ok(builder.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const NO_MACROS: &[&str] = &[];

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.vert", "void main() {}");

        let h1 = SourceFingerprinter::fingerprint(&a, NO_MACROS).unwrap();
        let h2 = SourceFingerprinter::fingerprint(&a, NO_MACROS).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn included_file_change_changes_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.frag", "#include \"common.glsl\"\nvoid main() {}");
        let common = write(dir.path(), "common.glsl", "float k = 1.0;");

        let before = SourceFingerprinter::fingerprint(&a, NO_MACROS).unwrap();
        fs::write(&common, "float k = 2.0;").unwrap();
        let after = SourceFingerprinter::fingerprint(&a, NO_MACROS).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn unrelated_file_change_keeps_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.vert", "void main() {}");
        let b = write(dir.path(), "b.frag", "void main() {}");

        let before = SourceFingerprinter::fingerprint(&a, NO_MACROS).unwrap();
        fs::write(&b, "void main() { discard; }").unwrap();
        let after = SourceFingerprinter::fingerprint(&a, NO_MACROS).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn macros_change_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.frag", "void main() {}");

        let plain = SourceFingerprinter::fingerprint(&a, NO_MACROS).unwrap();
        let shadow = SourceFingerprinter::fingerprint(&a, &["SHADOWS=1"]).unwrap();
        let fog = SourceFingerprinter::fingerprint(&a, &["FOG"]).unwrap();
        assert_ne!(plain, shadow);
        assert_ne!(shadow, fog);
    }

    #[test]
    fn macro_order_is_irrelevant() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.frag", "void main() {}");

        let ab = SourceFingerprinter::fingerprint(&a, &["A", "B"]).unwrap();
        let ba = SourceFingerprinter::fingerprint(&a, &["B", "A"]).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn macro_boundaries_are_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.frag", "void main() {}");

        let split_late = SourceFingerprinter::fingerprint(&a, &["AB", "C"]).unwrap();
        let split_early = SourceFingerprinter::fingerprint(&a, &["A", "BC"]).unwrap();
        assert_ne!(split_late, split_early);
    }

    #[test]
    fn cyclic_closure_fingerprints() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.vert", "#include \"b.glsl\"\nvoid main() {}");
        write(dir.path(), "b.glsl", "#include \"a.vert\"\n");
        assert!(SourceFingerprinter::fingerprint(&a, NO_MACROS).is_ok());
    }

    #[test]
    fn missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceFingerprinter::fingerprint(&dir.path().join("gone.vert"), NO_MACROS)
            .unwrap_err();
        assert!(matches!(err, CacheError::Resolve(_)));
    }

    #[test]
    fn dependency_removed_after_resolution_fails() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.frag", "#include \"dep.glsl\"\nvoid main() {}");
        let dep = write(dir.path(), "dep.glsl", "float x;");

        let closure = resolve_includes(&a).unwrap();
        fs::remove_file(&dep).unwrap();
        let err = SourceFingerprinter::fingerprint_closure(&closure, NO_MACROS).unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
    }
}
