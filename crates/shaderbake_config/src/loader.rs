//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ToolConfig;
use std::path::Path;

/// Name of the tool configuration file.
pub const CONFIG_FILE: &str = "shaderbake.toml";

/// Loads and validates `shaderbake.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ToolConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Read {
        path: config_path.clone(),
        source: e,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates a `shaderbake.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ToolConfig, ConfigError> {
    let config: ToolConfig =
        toml::from_str(content).map_err(|e| ConfigError::Toml(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required values are non-empty.
fn validate_config(config: &ToolConfig) -> Result<(), ConfigError> {
    let required = [
        ("paths.source", &config.paths.source),
        ("paths.target", &config.paths.target),
        ("paths.cache", &config.paths.cache),
        ("compiler.program", &config.compiler.program),
        ("compiler.target_env", &config.compiler.target_env),
        ("scan.artifact_suffix", &config.scan.artifact_suffix),
        ("scan.entry_point_marker", &config.scan.entry_point_marker),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::EmptySetting(name));
        }
    }
    Ok(())
}
