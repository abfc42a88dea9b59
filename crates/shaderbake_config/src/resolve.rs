//! Resolution of configured paths against the project directory.

use std::path::{Path, PathBuf};

use crate::types::ToolConfig;

/// The configured locations resolved to concrete paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// The directory the configuration is relative to.
    pub project_dir: PathBuf,
    /// Root of the shader source tree.
    pub source_root: PathBuf,
    /// Root of the compiled artifact tree.
    pub target_root: PathBuf,
    /// The build cache file.
    pub cache_file: PathBuf,
    /// The variant configuration file, if one is configured.
    pub variants_file: Option<PathBuf>,
}

/// Joins every configured path onto `project_dir`.
///
/// Absolute configured paths are kept as-is. An empty `paths.variants`
/// disables the variant file.
pub fn resolve_paths(config: &ToolConfig, project_dir: &Path) -> ResolvedPaths {
    let variants = config.paths.variants.trim();
    ResolvedPaths {
        project_dir: project_dir.to_path_buf(),
        source_root: project_dir.join(&config.paths.source),
        target_root: project_dir.join(&config.paths.target),
        cache_file: project_dir.join(&config.paths.cache),
        variants_file: (!variants.is_empty()).then(|| project_dir.join(variants)),
    }
}
