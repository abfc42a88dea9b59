//! Incremental shader build orchestration.
//!
//! Enumerates compile tasks from the source tree and the variant file, decides
//! which are stale by comparing include-closure fingerprints against the build
//! cache, invokes the external compiler for the rest, and records successful
//! compiles back into the cache.

#![warn(missing_docs)]

pub mod compiler;
pub mod error;
pub mod orchestrator;
pub mod tasks;

pub use compiler::{CompileResult, ProcessOutput, ProcessRunner, ShaderCompiler, SystemRunner};
pub use error::BuildError;
pub use orchestrator::{
    task_status, BuildEvent, BuildOptions, BuildSummary, Builder, Plan, PlannedTask, StaleReason,
    TaskStatus,
};
pub use tasks::{
    CompileTask, Enumeration, MacroSet, ShadowedTask, SkipReason, SkippedVariant, TaskEnumerator,
    TaskKey,
};
