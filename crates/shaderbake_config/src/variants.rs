//! The line-oriented variant configuration file.
//!
//! Each non-blank, non-comment line declares one extra artifact:
//!
//! ```text
//! // source                output name                 macros...
//! pbr/lit.frag             pbr/lit_shadowed.frag.spv   SHADOWS=1 PCF
//! ```
//!
//! Fields are whitespace-separated. The source path is relative to the source
//! root and the output name relative to the target root.

use std::path::Path;

use crate::error::ConfigError;

/// Prefix of a comment line.
const COMMENT_MARKER: &str = "//";

/// One declared variant: a source compiled with an explicit macro set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSpec {
    /// Source path relative to the source root.
    pub source: String,
    /// Artifact path relative to the target root.
    pub output: String,
    /// Macros in declaration order, each passed as `-D<macro>`.
    pub macros: Vec<String>,
    /// 1-based line number in the variant file.
    pub line: usize,
}

/// Parses variant declarations from the file content.
///
/// Blank lines and `//` comment lines are ignored. A line with fewer than two
/// fields cannot name an artifact and is skipped.
pub fn parse_variants(content: &str) -> Vec<VariantSpec> {
    let mut variants = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(source), Some(output)) = (fields.next(), fields.next()) else {
            log::debug!("variant line {}: expected `<source> <output> [macro]...`", idx + 1);
            continue;
        };
        variants.push(VariantSpec {
            source: source.to_string(),
            output: output.to_string(),
            macros: fields.map(str::to_string).collect(),
            line: idx + 1,
        });
    }
    variants
}

/// Reads and parses the variant file at `path`.
///
/// A missing file is not an error: the variant file is optional. Bytes that
/// are not valid UTF-8 are replaced, so one bad line cannot hide the others.
pub fn load_variants(path: &Path) -> Result<Vec<VariantSpec>, ConfigError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(parse_variants(&String::from_utf8_lossy(&bytes))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
