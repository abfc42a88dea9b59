//! Compile task enumeration.
//!
//! Tasks come from two places: a scan of the source tree, where every file with
//! a recognized stage extension and an entry point becomes a default task with
//! no macros, and the variant file, which declares extra artifacts built with
//! explicit macros. Both are merged into one map keyed by (source, macro set)
//! and returned in key order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use shaderbake_config::{load_variants, ConfigError, ResolvedPaths, ScanConfig, VariantSpec};
use shaderbake_source::{detect_stage, normalize_path, relative_key, ShaderSource};
use walkdir::WalkDir;

use crate::error::BuildError;

/// A normalized set of macro definitions.
///
/// Duplicates collapse and iteration is always sorted, so two declarations
/// listing the same macros in a different order name the same task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacroSet(BTreeSet<String>);

impl MacroSet {
    /// The empty macro set used by default tasks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no macros are defined.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct macros.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the macros in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for MacroSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for MacroSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, m) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(m)?;
        }
        f.write_str("]")
    }
}

/// Identity of a compile task.
///
/// Ordering is by source key, then by sorted macro list, which fixes the
/// compile and log order across runs and platforms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskKey {
    /// Source path relative to the source root, `/`-separated.
    pub source: String,
    /// Macros passed to the compiler.
    pub macros: MacroSet,
}

/// One unit of compilation: a source and macro set mapped to an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileTask {
    /// The task identity.
    pub key: TaskKey,
    /// Normalized path of the shader source.
    pub source: PathBuf,
    /// Path of the artifact to produce.
    pub target: PathBuf,
}

impl CompileTask {
    /// The macros this task is compiled with.
    pub fn macros(&self) -> &MacroSet {
        &self.key.macros
    }
}

/// Why a variant declaration did not become a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The declared source does not exist.
    SourceMissing,
    /// The declared output resolves outside the target root.
    OutputOutsideTarget,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::SourceMissing => f.write_str("source not found"),
            SkipReason::OutputOutsideTarget => f.write_str("output is outside the target directory"),
        }
    }
}

/// A variant declaration that was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedVariant {
    /// The offending declaration.
    pub spec: VariantSpec,
    /// The resolved source for [`SkipReason::SourceMissing`], the resolved
    /// output otherwise.
    pub path: PathBuf,
    /// What was wrong with it.
    pub reason: SkipReason,
}

/// A task dropped because a later declaration writes the same artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowedTask {
    /// The dropped task.
    pub task: CompileTask,
    /// The task that now owns the artifact.
    pub winner: TaskKey,
}

/// Result of task enumeration.
#[derive(Debug, Default)]
pub struct Enumeration {
    /// Deduplicated tasks in key order, at most one per artifact.
    pub tasks: Vec<CompileTask>,
    /// Variant declarations that were rejected.
    pub skipped_variants: Vec<SkippedVariant>,
    /// Tasks that lost their artifact path to a later declaration.
    pub shadowed: Vec<ShadowedTask>,
    /// Set when the variant file exists but could not be read. Scanned tasks
    /// are still enumerated.
    pub variants_error: Option<ConfigError>,
}

/// Discovers compile tasks under a source root.
pub struct TaskEnumerator<'a> {
    source_root: &'a Path,
    target_root: &'a Path,
    variants_file: Option<&'a Path>,
    scan: &'a ScanConfig,
}

impl<'a> TaskEnumerator<'a> {
    /// Creates an enumerator for the resolved project layout.
    pub fn new(paths: &'a ResolvedPaths, scan: &'a ScanConfig) -> Self {
        Self {
            source_root: &paths.source_root,
            target_root: &paths.target_root,
            variants_file: paths.variants_file.as_deref(),
            scan,
        }
    }

    /// Scans the source tree and reads the variant file, then merges both.
    ///
    /// An unreadable variant file is recorded in
    /// [`Enumeration::variants_error`] and treated as empty.
    pub fn enumerate(&self) -> Result<Enumeration, BuildError> {
        let (variants, variants_error) = match self.variants_file.map(load_variants) {
            Some(Ok(variants)) => (variants, None),
            Some(Err(e)) => {
                log::warn!("{e}; building without variants");
                (Vec::new(), Some(e))
            }
            None => (Vec::new(), None),
        };
        let mut enumeration = self.enumerate_with(&variants)?;
        enumeration.variants_error = variants_error;
        Ok(enumeration)
    }

    /// Scans the source tree and merges in the given variant declarations.
    ///
    /// Scanned tasks come first in declaration order, then variants in file
    /// order. A later declaration with the same key replaces an earlier one,
    /// and when two tasks write the same artifact the later one keeps it.
    pub fn enumerate_with(&self, variants: &[VariantSpec]) -> Result<Enumeration, BuildError> {
        let mut declared: BTreeMap<TaskKey, (usize, CompileTask)> = BTreeMap::new();
        let mut seq = 0;
        for task in self.scan_sources()? {
            declared.insert(task.key.clone(), (seq, task));
            seq += 1;
        }

        let mut skipped_variants = Vec::new();
        for spec in variants {
            let source = normalize_path(&self.source_root.join(&spec.source));
            if !source.is_file() {
                skipped_variants.push(SkippedVariant {
                    spec: spec.clone(),
                    path: source,
                    reason: SkipReason::SourceMissing,
                });
                continue;
            }
            let target = normalize_path(&self.target_root.join(&spec.output));
            if !relative_key(&target, self.target_root).is_some_and(|k| !k.is_empty()) {
                skipped_variants.push(SkippedVariant {
                    spec: spec.clone(),
                    path: target,
                    reason: SkipReason::OutputOutsideTarget,
                });
                continue;
            }
            let key = TaskKey {
                source: self.source_key(&source),
                macros: spec.macros.iter().cloned().collect(),
            };
            declared.insert(key.clone(), (seq, CompileTask { key, source, target }));
            seq += 1;
        }

        let mut owners: BTreeMap<&Path, (usize, &TaskKey)> = BTreeMap::new();
        for (key, (seq, task)) in &declared {
            let owner = owners.entry(task.target.as_path()).or_insert((*seq, key));
            if *seq > owner.0 {
                *owner = (*seq, key);
            }
        }
        let owners: BTreeMap<PathBuf, TaskKey> = owners
            .into_iter()
            .map(|(path, (_, key))| (path.to_path_buf(), key.clone()))
            .collect();

        let mut tasks = Vec::new();
        let mut shadowed = Vec::new();
        for (key, (_, task)) in declared {
            match owners.get(&task.target) {
                Some(winner) if *winner != key => {
                    log::warn!(
                        "{} {} and {} {} both write {}; keeping the later declaration",
                        key.source,
                        key.macros,
                        winner.source,
                        winner.macros,
                        task.target.display()
                    );
                    shadowed.push(ShadowedTask {
                        task,
                        winner: winner.clone(),
                    });
                }
                _ => tasks.push(task),
            }
        }

        Ok(Enumeration {
            tasks,
            skipped_variants,
            shadowed,
            variants_error: None,
        })
    }

    /// Walks the source root and returns one default task per compilable file.
    ///
    /// Files that cannot be read are assumed compilable and left for the
    /// compiler to report on.
    pub fn scan_sources(&self) -> Result<Vec<CompileTask>, BuildError> {
        if !self.source_root.is_dir() {
            return Err(BuildError::SourceRootMissing(self.source_root.to_path_buf()));
        }

        let mut tasks = Vec::new();
        for entry in WalkDir::new(self.source_root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("skipping unreadable entry while scanning shaders: {e}");
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || detect_stage(path).is_none() {
                continue;
            }
            if !self.is_compilable(path) {
                log::debug!("{}: no entry point, treating as include-only", path.display());
                continue;
            }
            let source = normalize_path(path);
            let key = TaskKey {
                source: self.source_key(&source),
                macros: MacroSet::new(),
            };
            let target = self.default_target(&source);
            tasks.push(CompileTask { key, source, target });
        }
        Ok(tasks)
    }

    fn is_compilable(&self, path: &Path) -> bool {
        match ShaderSource::load(path) {
            Ok(Some(source)) => source.has_entry_point(&self.scan.entry_point_marker),
            Ok(None) => false,
            Err(e) => {
                log::warn!("cannot check {} for an entry point: {e}", path.display());
                true
            }
        }
    }

    /// Mirrors `source` under the target root and appends the artifact suffix
    /// to the file name (`pbr/lit.frag` → `pbr/lit.frag.spv`).
    fn default_target(&self, source: &Path) -> PathBuf {
        let rel = source
            .strip_prefix(normalize_path(self.source_root))
            .unwrap_or(source);
        let mut name = rel.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(&self.scan.artifact_suffix);
        normalize_path(&self.target_root.join(rel).with_file_name(name))
    }

    fn source_key(&self, source: &Path) -> String {
        relative_key(source, self.source_root)
            .unwrap_or_else(|| source.to_string_lossy().replace('\\', "/"))
    }
}
