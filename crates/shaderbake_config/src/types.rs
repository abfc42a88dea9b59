//! Configuration types deserialized from `shaderbake.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// The top-level tool configuration parsed from `shaderbake.toml`.
///
/// Every section is optional; a missing section (or a missing file) yields
/// the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolConfig {
    /// Filesystem layout, relative to the directory holding the config file.
    #[serde(default)]
    pub paths: PathsConfig,
    /// External compiler invocation settings.
    #[serde(default)]
    pub compiler: CompilerConfig,
    /// Source tree scanning rules.
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Locations of the source tree, artifact tree, cache file and variant file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the shader source tree.
    pub source: String,
    /// Root of the compiled artifact tree; mirrors the source layout.
    pub target: String,
    /// The build cache file.
    pub cache: String,
    /// The optional variant configuration file.
    pub variants: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: "shaders".to_string(),
            target: "assets/shaders".to_string(),
            cache: ".shaderbake/cache.json".to_string(),
            variants: "shaders.cfg".to_string(),
        }
    }
}

/// Settings for invoking the external shader compiler.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Compiler executable name or path.
    pub program: String,
    /// Value passed as `--target-env=<value>`.
    pub target_env: String,
    /// Optimization level.
    pub optimization: OptLevel,
    /// Text whose presence anywhere in a shader's include closure enables
    /// the 64-bit integer define.
    pub int64_marker: String,
    /// Define (without `-D`) added when the int64 marker is present.
    pub int64_define: String,
    /// Extra arguments appended before the input path.
    ///
    /// Accepts either a single string or a list of strings.
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub extra_args: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: "glslc".to_string(),
            target_env: "vulkan1.3".to_string(),
            optimization: OptLevel::default(),
            int64_marker: "#extension GL_EXT_shader_explicit_arithmetic_types_int64".to_string(),
            int64_define: "SPV_KHR_shader_explicit_arithmetic_types_int64=1".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Rules for turning scanned source files into default compile tasks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Extension appended to a source file name to name its artifact
    /// (`a.vert` → `a.vert.spv`).
    pub artifact_suffix: String,
    /// Text a scanned file must contain to be compiled on its own.
    pub entry_point_marker: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            artifact_suffix: "spv".to_string(),
            entry_point_marker: "void main".to_string(),
        }
    }
}

/// Deserializes a field that can be either a single string or a list of strings.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Optimization level passed to the compiler.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OptLevel {
    /// No optimization (`-O0`).
    None,
    /// Optimize for size (`-Os`).
    Size,
    /// Optimize for performance (`-O`, default).
    #[default]
    Performance,
}

impl OptLevel {
    /// Returns the compiler flag for this level.
    pub fn flag(self) -> &'static str {
        match self {
            OptLevel::None => "-O0",
            OptLevel::Size => "-Os",
            OptLevel::Performance => "-O",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn opt_level_all_variants() {
        for (input, expected, flag) in [
            ("none", OptLevel::None, "-O0"),
            ("size", OptLevel::Size, "-Os"),
            ("performance", OptLevel::Performance, "-O"),
        ] {
            let toml = format!("[compiler]\noptimization = \"{input}\"\n");
            let config = load_config_from_str(&toml).unwrap();
            assert_eq!(config.compiler.optimization, expected);
            assert_eq!(config.compiler.optimization.flag(), flag);
        }
    }

    #[test]
    fn opt_level_rejects_unknown() {
        assert!(load_config_from_str("[compiler]\noptimization = \"fast\"\n").is_err());
    }

    #[test]
    fn extra_args_single_string() {
        let config = load_config_from_str("[compiler]\nextra_args = \"-g\"\n").unwrap();
        assert_eq!(config.compiler.extra_args, vec!["-g"]);
    }

    #[test]
    fn extra_args_list() {
        let config =
            load_config_from_str("[compiler]\nextra_args = [\"-g\", \"-Werror\"]\n").unwrap();
        assert_eq!(config.compiler.extra_args, vec!["-g", "-Werror"]);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = load_config_from_str("[paths]\nsource = \"src/shaders\"\n").unwrap();
        assert_eq!(config.paths.source, "src/shaders");
        assert_eq!(config.paths.target, "assets/shaders");
        assert_eq!(config.paths.cache, ".shaderbake/cache.json");
    }
}
