//! Locating the project and loading its configuration.

use std::path::{Path, PathBuf};

use shaderbake_config::{
    load_config, load_config_from_str, resolve_paths, ResolvedPaths, ToolConfig, CONFIG_FILE,
};

use crate::GlobalArgs;

/// A loaded project: its configuration and the absolute paths derived from it.
#[derive(Debug)]
pub struct Project {
    /// The configuration file in use, if any.
    pub config_file: Option<PathBuf>,
    /// The tool configuration.
    pub config: ToolConfig,
    /// Resolved source, target, cache and variant paths.
    pub paths: ResolvedPaths,
}

/// Walks up from `start` looking for the nearest directory containing
/// `shaderbake.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).is_file() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Loads the project selected by the global CLI args.
///
/// With `--config`, a file is loaded directly and a directory must contain
/// `shaderbake.toml`. Otherwise the nearest `shaderbake.toml` above the
/// current directory is used, falling back to built-in defaults rooted at
/// the current directory.
pub fn load_project(global: &GlobalArgs) -> Result<Project, Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    load_project_from(global.config.as_deref(), &cwd)
}

fn load_project_from(
    explicit: Option<&str>,
    cwd: &Path,
) -> Result<Project, Box<dyn std::error::Error>> {
    let (project_dir, config_file, config) = match explicit {
        Some(path) => {
            let p = cwd.join(path);
            if p.is_file() {
                let content = std::fs::read_to_string(&p)?;
                let config = load_config_from_str(&content)
                    .map_err(|e| format!("{}: {e}", p.display()))?;
                let dir = p.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.to_path_buf());
                (dir, Some(p), config)
            } else if p.join(CONFIG_FILE).is_file() {
                let config = load_config(&p)
                    .map_err(|e| format!("{}: {e}", p.join(CONFIG_FILE).display()))?;
                let file = p.join(CONFIG_FILE);
                (p, Some(file), config)
            } else {
                return Err(format!("configuration file {} not found", p.display()).into());
            }
        }
        None => match find_project_root(cwd) {
            Some(dir) => {
                let file = dir.join(CONFIG_FILE);
                let config = load_config(&dir).map_err(|e| format!("{}: {e}", file.display()))?;
                (dir, Some(file), config)
            }
            None => {
                log::debug!("no {CONFIG_FILE} found, using defaults");
                (cwd.to_path_buf(), None, ToolConfig::default())
            }
        },
    };

    let paths = resolve_paths(&config, &project_dir);
    Ok(Project {
        config_file,
        config,
        paths,
    })
}

/// Formats `path` relative to `base` for display, falling back to the full path.
pub fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
