//! The build loop.
//!
//! [`Builder::run`] enumerates tasks, loads the cache once, and then processes
//! one task at a time: fingerprint, cache lookup, and either skip or compile.
//! Every successful compile is written back to the cache store immediately so
//! an interrupted run keeps the work it already finished.

use std::path::Path;
use std::time::{Duration, Instant};

use shaderbake_cache::{artifact_key, BuildCache, CacheStore, SourceFingerprinter};
use shaderbake_config::{ConfigError, ResolvedPaths, ToolConfig};

use crate::compiler::{CompileResult, ProcessRunner, ShaderCompiler};
use crate::error::BuildError;
use crate::tasks::{CompileTask, Enumeration, ShadowedTask, SkippedVariant, TaskEnumerator};

/// Options that change how a build treats the cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Compile every task regardless of the cache.
    pub force: bool,
}

/// Why a task has to be compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// The build was run with `force`.
    Forced,
    /// The artifact does not exist on disk.
    MissingArtifact,
    /// The cache has no entry for the artifact.
    NotCached,
    /// The fingerprint differs from the cached one.
    Changed,
    /// The fingerprint could not be computed.
    Unfingerprintable,
}

impl std::fmt::Display for StaleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StaleReason::Forced => "forced",
            StaleReason::MissingArtifact => "artifact missing",
            StaleReason::NotCached => "not cached",
            StaleReason::Changed => "sources changed",
            StaleReason::Unfingerprintable => "cannot fingerprint",
        };
        f.write_str(s)
    }
}

/// Whether a task can be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// The artifact exists and the cached fingerprint matches.
    UpToDate,
    /// The task must be compiled.
    Stale(StaleReason),
}

impl TaskStatus {
    /// Returns `true` for [`TaskStatus::UpToDate`].
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, TaskStatus::UpToDate)
    }
}

/// Decides whether `task` is up to date against `cache`.
///
/// A missing artifact or a fingerprint that cannot be computed always means
/// stale; unknown state is never treated as clean.
pub fn task_status(task: &CompileTask, cache: &BuildCache, target_root: &Path) -> TaskStatus {
    if !task.target.is_file() {
        return TaskStatus::Stale(StaleReason::MissingArtifact);
    }
    let current = match fingerprint_task(task) {
        Some(fp) => fp,
        None => return TaskStatus::Stale(StaleReason::Unfingerprintable),
    };
    match cache.get(&artifact_key(&task.target, target_root)) {
        None => TaskStatus::Stale(StaleReason::NotCached),
        Some(cached) if cached == current => TaskStatus::UpToDate,
        Some(_) => TaskStatus::Stale(StaleReason::Changed),
    }
}

fn fingerprint_task(task: &CompileTask) -> Option<shaderbake_common::Fingerprint> {
    let macros: Vec<&str> = task.macros().iter().collect();
    match SourceFingerprinter::fingerprint(&task.source, &macros) {
        Ok(fp) => Some(fp),
        Err(e) => {
            log::debug!("{}: {e}", task.key.source);
            None
        }
    }
}

/// Progress notifications emitted during [`Builder::run`].
#[derive(Debug)]
pub enum BuildEvent<'a> {
    /// The variant file exists but could not be read. Counted as a failure.
    VariantFileUnreadable {
        /// The read error.
        error: &'a ConfigError,
    },
    /// A variant declaration was rejected. Counted as a failure.
    VariantSkipped {
        /// The rejected declaration.
        variant: &'a SkippedVariant,
    },
    /// A task was dropped because a later declaration writes its artifact.
    Shadowed {
        /// The dropped task and the one that replaced it.
        shadowed: &'a ShadowedTask,
    },
    /// The task is about to be compiled.
    Compiling {
        /// The task.
        task: &'a CompileTask,
        /// Why it is being compiled.
        reason: StaleReason,
    },
    /// The compiler succeeded.
    Compiled {
        /// The task.
        task: &'a CompileTask,
    },
    /// The compiler failed.
    Failed {
        /// The task.
        task: &'a CompileTask,
        /// Compiler diagnostics.
        diagnostic: &'a str,
    },
    /// The task was skipped.
    UpToDate {
        /// The task.
        task: &'a CompileTask,
    },
}

/// Aggregate counts for one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Tasks compiled successfully.
    pub compiled: usize,
    /// Tasks that failed, plus rejected variants and an unreadable variant file.
    pub failed: usize,
    /// Tasks skipped because they were up to date.
    pub up_to_date: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

impl BuildSummary {
    /// Returns `true` if nothing failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// A task paired with its current status, as reported by [`Builder::plan`].
#[derive(Debug, Clone)]
pub struct PlannedTask {
    /// The task.
    pub task: CompileTask,
    /// Its status against the cache.
    pub status: TaskStatus,
}

/// What a build would do, without compiling anything.
#[derive(Debug, Default)]
pub struct Plan {
    /// All tasks in build order.
    pub tasks: Vec<PlannedTask>,
    /// Variant declarations that were rejected.
    pub skipped_variants: Vec<SkippedVariant>,
    /// Tasks dropped in favor of a later declaration of the same artifact.
    pub shadowed: Vec<ShadowedTask>,
    /// Why the variant file could not be read, if it could not.
    pub variants_error: Option<ConfigError>,
}

/// Runs incremental builds for one project.
pub struct Builder<'a, R> {
    paths: &'a ResolvedPaths,
    config: &'a ToolConfig,
    store: &'a mut dyn CacheStore,
    compiler: ShaderCompiler<R>,
    options: BuildOptions,
}

impl<'a, R: ProcessRunner> Builder<'a, R> {
    /// Creates a builder that compiles through `runner` and persists to `store`.
    pub fn new(
        paths: &'a ResolvedPaths,
        config: &'a ToolConfig,
        store: &'a mut dyn CacheStore,
        runner: R,
    ) -> Self {
        Self {
            paths,
            config,
            store,
            compiler: ShaderCompiler::new(config.compiler.clone(), runner),
            options: BuildOptions::default(),
        }
    }

    /// Sets the build options.
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the compiler driver.
    pub fn compiler(&self) -> &ShaderCompiler<R> {
        &self.compiler
    }

    /// Enumerates tasks and reports each one's status without compiling.
    pub fn plan(&self) -> Result<Plan, BuildError> {
        let enumeration = TaskEnumerator::new(self.paths, &self.config.scan).enumerate()?;
        let cache = self.store.load();
        let tasks = enumeration
            .tasks
            .into_iter()
            .map(|task| {
                let status = self.status_of(&task, &cache);
                PlannedTask { task, status }
            })
            .collect();
        Ok(Plan {
            tasks,
            skipped_variants: enumeration.skipped_variants,
            shadowed: enumeration.shadowed,
            variants_error: enumeration.variants_error,
        })
    }

    /// Runs the build, reporting progress through `on_event`.
    ///
    /// Only setup problems return `Err`. Per-task failures are counted in the
    /// summary and the run continues with the next task.
    pub fn run(
        &mut self,
        on_event: &mut dyn FnMut(BuildEvent<'_>),
    ) -> Result<BuildSummary, BuildError> {
        let start = Instant::now();
        let enumeration = TaskEnumerator::new(self.paths, &self.config.scan).enumerate()?;
        let mut summary = BuildSummary::default();
        report_declarations(&enumeration, &mut summary, on_event);

        let mut cache = self.store.load();
        log::debug!(
            "{} tasks, {} cache entries",
            enumeration.tasks.len(),
            cache.len()
        );

        for task in &enumeration.tasks {
            let reason = match self.status_of(task, &cache) {
                TaskStatus::UpToDate => {
                    summary.up_to_date += 1;
                    on_event(BuildEvent::UpToDate { task });
                    continue;
                }
                TaskStatus::Stale(reason) => reason,
            };

            on_event(BuildEvent::Compiling { task, reason });
            match self.compiler.compile(task) {
                CompileResult::Success => {
                    summary.compiled += 1;
                    self.record(task, &mut cache);
                    on_event(BuildEvent::Compiled { task });
                }
                CompileResult::Failed { diagnostic } => {
                    summary.failed += 1;
                    on_event(BuildEvent::Failed {
                        task,
                        diagnostic: &diagnostic,
                    });
                }
            }
        }

        summary.elapsed = start.elapsed();
        Ok(summary)
    }

    fn status_of(&self, task: &CompileTask, cache: &BuildCache) -> TaskStatus {
        if self.options.force {
            TaskStatus::Stale(StaleReason::Forced)
        } else {
            task_status(task, cache, &self.paths.target_root)
        }
    }

    /// Recomputes the fingerprint after a successful compile and saves it.
    fn record(&mut self, task: &CompileTask, cache: &mut BuildCache) {
        let Some(fp) = fingerprint_task(task) else {
            log::warn!(
                "{}: cannot fingerprint after compiling, it will be rebuilt next time",
                task.key.source
            );
            return;
        };
        cache.insert(artifact_key(&task.target, &self.paths.target_root), fp);
        if let Err(e) = self.store.save(cache) {
            log::warn!("failed to save build cache: {e}");
        }
    }
}

/// Reports problems found while reading declarations, before any task runs.
fn report_declarations(
    enumeration: &Enumeration,
    summary: &mut BuildSummary,
    on_event: &mut dyn FnMut(BuildEvent<'_>),
) {
    if let Some(error) = &enumeration.variants_error {
        summary.failed += 1;
        on_event(BuildEvent::VariantFileUnreadable { error });
    }
    for variant in &enumeration.skipped_variants {
        summary.failed += 1;
        on_event(BuildEvent::VariantSkipped { variant });
    }
    for shadowed in &enumeration.shadowed {
        on_event(BuildEvent::Shadowed { shadowed });
    }
}
