//! Shader stage kinds recognized by file extension.

use std::fmt;
use std::path::Path;

/// The pipeline stage a shader source file is written for.
///
/// Determined purely from the file extension. [`ShaderStage::Glsl`] covers the
/// generic `.glsl` extension, which may hold either a standalone shader or a
/// shared include-only file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    /// Compute shader (`.comp`).
    Compute,
    /// Fragment shader (`.frag`).
    Fragment,
    /// Geometry shader (`.geom`).
    Geometry,
    /// Mesh shader (`.mesh`).
    Mesh,
    /// Ray any-hit shader (`.rahit`).
    RayAnyHit,
    /// Ray callable shader (`.rcall`).
    RayCallable,
    /// Ray closest-hit shader (`.rchit`).
    RayClosestHit,
    /// Ray generation shader (`.rgen`).
    RayGeneration,
    /// Ray intersection shader (`.rint`).
    RayIntersection,
    /// Ray miss shader (`.rmiss`).
    RayMiss,
    /// Task shader (`.task`).
    Task,
    /// Tessellation control shader (`.tesc`).
    TessControl,
    /// Tessellation evaluation shader (`.tese`).
    TessEvaluation,
    /// Vertex shader (`.vert`).
    Vertex,
    /// Generic GLSL source (`.glsl`).
    Glsl,
}

impl ShaderStage {
    /// Every recognized stage, in extension order.
    pub const ALL: [ShaderStage; 15] = [
        ShaderStage::Compute,
        ShaderStage::Fragment,
        ShaderStage::Geometry,
        ShaderStage::Mesh,
        ShaderStage::RayAnyHit,
        ShaderStage::RayCallable,
        ShaderStage::RayClosestHit,
        ShaderStage::RayGeneration,
        ShaderStage::RayIntersection,
        ShaderStage::RayMiss,
        ShaderStage::Task,
        ShaderStage::TessControl,
        ShaderStage::TessEvaluation,
        ShaderStage::Vertex,
        ShaderStage::Glsl,
    ];

    /// Returns the file extension (without the dot) for this stage.
    pub fn extension(self) -> &'static str {
        match self {
            ShaderStage::Compute => "comp",
            ShaderStage::Fragment => "frag",
            ShaderStage::Geometry => "geom",
            ShaderStage::Mesh => "mesh",
            ShaderStage::RayAnyHit => "rahit",
            ShaderStage::RayCallable => "rcall",
            ShaderStage::RayClosestHit => "rchit",
            ShaderStage::RayGeneration => "rgen",
            ShaderStage::RayIntersection => "rint",
            ShaderStage::RayMiss => "rmiss",
            ShaderStage::Task => "task",
            ShaderStage::TessControl => "tesc",
            ShaderStage::TessEvaluation => "tese",
            ShaderStage::Vertex => "vert",
            ShaderStage::Glsl => "glsl",
        }
    }

    /// Looks up a stage from a bare extension such as `"vert"`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.extension() == ext)
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShaderStage::Compute => "compute",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Mesh => "mesh",
            ShaderStage::RayAnyHit => "ray any hit",
            ShaderStage::RayCallable => "ray callable",
            ShaderStage::RayClosestHit => "ray closest hit",
            ShaderStage::RayGeneration => "ray generation",
            ShaderStage::RayIntersection => "ray intersection",
            ShaderStage::RayMiss => "ray miss",
            ShaderStage::Task => "task",
            ShaderStage::TessControl => "tessellation control",
            ShaderStage::TessEvaluation => "tessellation evaluation",
            ShaderStage::Vertex => "vertex",
            ShaderStage::Glsl => "glsl",
        };
        f.write_str(name)
    }
}

/// Detects the shader stage from a file's extension.
///
/// Returns `None` for unrecognized extensions.
pub fn detect_stage(path: &Path) -> Option<ShaderStage> {
    ShaderStage::from_extension(path.extension()?.to_str()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_known_extensions() {
        assert_eq!(detect_stage(Path::new("a.vert")), Some(ShaderStage::Vertex));
        assert_eq!(detect_stage(Path::new("dir/b.frag")), Some(ShaderStage::Fragment));
        assert_eq!(detect_stage(Path::new("c.rchit")), Some(ShaderStage::RayClosestHit));
        assert_eq!(detect_stage(Path::new("common.glsl")), Some(ShaderStage::Glsl));
    }

    #[test]
    fn detect_unknown_extension() {
        assert_eq!(detect_stage(Path::new("readme.md")), None);
        assert_eq!(detect_stage(Path::new("a.vert.spv")), None);
        assert_eq!(detect_stage(Path::new("Makefile")), None);
    }

    #[test]
    fn extension_roundtrip() {
        for stage in ShaderStage::ALL {
            assert_eq!(ShaderStage::from_extension(stage.extension()), Some(stage));
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::TessControl.to_string(), "tessellation control");
    }
}
