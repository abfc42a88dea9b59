//! External shader compiler invocation.
//!
//! [`ShaderCompiler`] turns a [`CompileTask`] into a compiler command line and
//! runs it through a [`ProcessRunner`], so the orchestration logic can be
//! exercised with a fake compiler.

use std::ffi::OsString;
use std::io;
use std::process::Command;

use shaderbake_config::CompilerConfig;
use shaderbake_source::resolve_includes;

use crate::tasks::CompileTask;

/// Captured result of running an external process to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// The exit code, or `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ProcessOutput {
    /// Returns `true` if the process exited with code 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs an external program and waits for it to finish.
pub trait ProcessRunner {
    /// Runs `program` with `args`, capturing its output.
    ///
    /// Returns `Err` only if the process could not be started or waited on.
    fn run(&mut self, program: &str, args: &[OsString]) -> io::Result<ProcessOutput>;
}

/// Runs programs with [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&mut self, program: &str, args: &[OsString]) -> io::Result<ProcessOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Outcome of compiling one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileResult {
    /// The compiler exited successfully.
    Success,
    /// The task could not be compiled.
    Failed {
        /// Compiler diagnostics, or a description of why it could not run.
        diagnostic: String,
    },
}

impl CompileResult {
    /// Returns `true` for [`CompileResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, CompileResult::Success)
    }
}

/// Builds compiler command lines and runs them.
pub struct ShaderCompiler<R> {
    config: CompilerConfig,
    runner: R,
}

impl<R: ProcessRunner> ShaderCompiler<R> {
    /// Creates a compiler driver with the given settings and process runner.
    pub fn new(config: CompilerConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Returns the process runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Returns `true` if the task's include closure uses 64-bit integer types.
    ///
    /// If the closure cannot be resolved or a file in it cannot be read, the
    /// answer is `true`: passing the define unnecessarily is harmless, while
    /// omitting it breaks compilation.
    pub fn needs_int64(&self, task: &CompileTask) -> bool {
        let marker = self.config.int64_marker.as_str();
        if marker.is_empty() {
            return false;
        }
        match resolve_includes(&task.source) {
            Ok(closure) => closure.any_file_contains(marker),
            Err(e) => {
                log::warn!("{e}; assuming 64-bit integer support is needed");
                true
            }
        }
    }

    /// Builds the argument list for compiling `task`.
    ///
    /// Layout: target environment, optimization flag, the int64 define when
    /// `int64` is set, one `-D` per macro in sorted order, configured extra
    /// arguments, the input path, then `-o` and the output path.
    pub fn command_args(&self, task: &CompileTask, int64: bool) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            format!("--target-env={}", self.config.target_env).into(),
            self.config.optimization.flag().into(),
        ];
        if int64 && !self.config.int64_define.is_empty() {
            args.push(format!("-D{}", self.config.int64_define).into());
        }
        args.extend(task.macros().iter().map(|m| OsString::from(format!("-D{m}"))));
        args.extend(self.config.extra_args.iter().map(OsString::from));
        args.push(task.source.clone().into_os_string());
        args.push("-o".into());
        args.push(task.target.clone().into_os_string());
        args
    }

    /// Compiles one task, creating the artifact's parent directory first.
    ///
    /// Never returns an error: anything that goes wrong becomes
    /// [`CompileResult::Failed`] with a diagnostic.
    pub fn compile(&mut self, task: &CompileTask) -> CompileResult {
        if let Some(parent) = task.target.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return CompileResult::Failed {
                    diagnostic: format!("cannot create directory {}: {e}", parent.display()),
                };
            }
        }

        let args = self.command_args(task, self.needs_int64(task));
        log::debug!("running {} {:?}", self.config.program, args);

        match self.runner.run(&self.config.program, &args) {
            Ok(output) if output.success() => CompileResult::Success,
            Ok(output) => {
                let stderr = output.stderr.trim();
                let diagnostic = if stderr.is_empty() {
                    match output.code {
                        Some(code) => format!("{} exited with status {code}", self.config.program),
                        None => format!("{} was terminated by a signal", self.config.program),
                    }
                } else {
                    stderr.to_string()
                };
                CompileResult::Failed { diagnostic }
            }
            Err(e) => CompileResult::Failed {
                diagnostic: format!("failed to run `{}`: {e}", self.config.program),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{MacroSet, TaskKey};
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Records invocations and replies with a fixed output.
    struct ScriptedRunner {
        reply: io::Result<ProcessOutput>,
        calls: Vec<(String, Vec<OsString>)>,
    }

    impl ScriptedRunner {
        fn replying(code: i32, stderr: &str) -> Self {
            Self {
                reply: Ok(ProcessOutput {
                    code: Some(code),
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                }),
                calls: Vec::new(),
            }
        }
    }

    impl ProcessRunner for ScriptedRunner {
        fn run(&mut self, program: &str, args: &[OsString]) -> io::Result<ProcessOutput> {
            self.calls.push((program.to_string(), args.to_vec()));
            match &self.reply {
                Ok(out) => Ok(out.clone()),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            }
        }
    }

    fn task(dir: &Path, source: &str, content: &str, macros: &[&str]) -> CompileTask {
        let path = dir.join("src").join(source);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        CompileTask {
            key: TaskKey {
                source: source.to_string(),
                macros: macros.iter().copied().collect::<MacroSet>(),
            },
            source: path,
            target: dir.join("out").join("nested").join(format!("{source}.spv")),
        }
    }

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn command_line_layout() {
        let dir = tempfile::tempdir().unwrap();
        let t = task(dir.path(), "lit.frag", "void main() {}", &["SHADOWS=1", "FOG"]);
        let compiler = ShaderCompiler::new(CompilerConfig::default(), SystemRunner);

        let args = strings(&compiler.command_args(&t, false));
        assert_eq!(args[0], "--target-env=vulkan1.3");
        assert_eq!(args[1], "-O");
        assert_eq!(args[2], "-DFOG");
        assert_eq!(args[3], "-DSHADOWS=1");
        assert_eq!(PathBuf::from(&args[4]), t.source);
        assert_eq!(args[5], "-o");
        assert_eq!(PathBuf::from(&args[6]), t.target);
        assert_eq!(args.len(), 7);
    }

    #[test]
    fn int64_define_precedes_macros() {
        let dir = tempfile::tempdir().unwrap();
        let t = task(dir.path(), "a.comp", "void main() {}", &["A"]);
        let compiler = ShaderCompiler::new(CompilerConfig::default(), SystemRunner);

        let args = strings(&compiler.command_args(&t, true));
        assert_eq!(args[2], "-DSPV_KHR_shader_explicit_arithmetic_types_int64=1");
        assert_eq!(args[3], "-DA");
    }

    #[test]
    fn extra_args_precede_input() {
        let dir = tempfile::tempdir().unwrap();
        let t = task(dir.path(), "a.vert", "void main() {}", &[]);
        let config = CompilerConfig {
            extra_args: vec!["-g".to_string()],
            ..CompilerConfig::default()
        };
        let compiler = ShaderCompiler::new(config, SystemRunner);
        let args = strings(&compiler.command_args(&t, false));
        assert_eq!(args[2], "-g");
        assert_eq!(PathBuf::from(&args[3]), t.source);
    }

    #[test]
    fn needs_int64_scans_includes() {
        let dir = tempfile::tempdir().unwrap();
        let t = task(dir.path(), "a.comp", "#include \"types.glsl\"\nvoid main() {}", &[]);
        fs::write(
            dir.path().join("src").join("types.glsl"),
            "#extension GL_EXT_shader_explicit_arithmetic_types_int64 : require\n",
        )
        .unwrap();
        let plain = task(dir.path(), "b.comp", "void main() {}", &[]);

        let compiler = ShaderCompiler::new(CompilerConfig::default(), SystemRunner);
        assert!(compiler.needs_int64(&t));
        assert!(!compiler.needs_int64(&plain));
    }

    #[test]
    fn needs_int64_when_source_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = task(dir.path(), "a.comp", "void main() {}", &[]);
        t.source = dir.path().join("missing.comp");
        let compiler = ShaderCompiler::new(CompilerConfig::default(), SystemRunner);
        assert!(compiler.needs_int64(&t));
    }

    #[test]
    fn compile_success_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let t = task(dir.path(), "a.vert", "void main() {}", &[]);
        let mut compiler =
            ShaderCompiler::new(CompilerConfig::default(), ScriptedRunner::replying(0, ""));

        assert_eq!(compiler.compile(&t), CompileResult::Success);
        assert!(t.target.parent().unwrap().is_dir());
        assert_eq!(compiler.runner().calls.len(), 1);
        assert_eq!(compiler.runner().calls[0].0, "glslc");
    }

    #[test]
    fn compile_failure_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let t = task(dir.path(), "a.vert", "void main() {", &[]);
        let mut compiler = ShaderCompiler::new(
            CompilerConfig::default(),
            ScriptedRunner::replying(1, "a.vert:1: error: unexpected end of file\n"),
        );

        assert_eq!(
            compiler.compile(&t),
            CompileResult::Failed {
                diagnostic: "a.vert:1: error: unexpected end of file".to_string()
            }
        );
    }

    #[test]
    fn compile_failure_without_stderr_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let t = task(dir.path(), "a.vert", "void main() {}", &[]);
        let mut compiler =
            ShaderCompiler::new(CompilerConfig::default(), ScriptedRunner::replying(3, ""));

        match compiler.compile(&t) {
            CompileResult::Failed { diagnostic } => {
                assert_eq!(diagnostic, "glslc exited with status 3")
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn compile_spawn_error_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let t = task(dir.path(), "a.vert", "void main() {}", &[]);
        let runner = ScriptedRunner {
            reply: Err(io::Error::new(io::ErrorKind::NotFound, "program not found")),
            calls: Vec::new(),
        };
        let mut compiler = ShaderCompiler::new(CompilerConfig::default(), runner);

        match compiler.compile(&t) {
            CompileResult::Failed { diagnostic } => {
                assert!(diagnostic.contains("failed to run `glslc`"));
                assert!(diagnostic.contains("program not found"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn process_output_success() {
        let ok = ProcessOutput {
            code: Some(0),
            ..ProcessOutput::default()
        };
        assert!(ok.success());
        assert!(!ProcessOutput::default().success());
    }
}
