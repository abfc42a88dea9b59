//! `shaderbake build`: compile every stale shader task.
//!
//! Loads the project, runs the incremental build through the system compiler,
//! prints a cargo-style line per compiled task and a summary. Returns exit
//! code 1 if any task failed.

use shaderbake_build::{
    BuildEvent, BuildOptions, BuildSummary, Builder, CompileTask, ShadowedTask, SkippedVariant,
    SystemRunner, TaskKey,
};
use shaderbake_cache::JsonFileStore;
use shaderbake_config::ResolvedPaths;

use crate::project::{display_relative, load_project};
use crate::{BuildArgs, GlobalArgs};

/// Runs the `shaderbake build` command.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    if let Some(ref file) = project.config_file {
        log::debug!("using configuration {}", file.display());
    }

    let paths = &project.paths;
    let mut store = JsonFileStore::new(&paths.cache_file);
    let mut builder = Builder::new(paths, &project.config, &mut store, SystemRunner)
        .with_options(BuildOptions { force: args.force });

    let summary = builder.run(&mut |event| report(&event, paths, global))?;

    if !global.quiet {
        eprintln!("{}", summary_line(&summary));
    }

    if summary.is_success() {
        Ok(0)
    } else {
        Ok(1)
    }
}

/// Prints one build event. Failures are printed even with `--quiet`.
fn report(event: &BuildEvent<'_>, paths: &ResolvedPaths, global: &GlobalArgs) {
    let show = match event {
        BuildEvent::Failed { .. }
        | BuildEvent::VariantFileUnreadable { .. }
        | BuildEvent::VariantSkipped { .. } => true,
        BuildEvent::Compiling { .. } | BuildEvent::Shadowed { .. } => !global.quiet,
        BuildEvent::UpToDate { .. } => global.verbose && !global.quiet,
        BuildEvent::Compiled { .. } => false,
    };
    if show {
        eprintln!("{}", event_line(event, paths));
    }
}

/// Formats a build event as a status line.
fn event_line(event: &BuildEvent<'_>, paths: &ResolvedPaths) -> String {
    match event {
        BuildEvent::Compiling { task, .. } => format!(
            "   Compiling {} -> {}",
            task_label(task),
            display_relative(&task.target, &paths.target_root)
        ),
        BuildEvent::Compiled { task } => format!("    Compiled {}", task_label(task)),
        BuildEvent::Failed { task, diagnostic } => {
            let mut line = format!("      Failed {}", task_label(task));
            for diag in diagnostic.lines() {
                line.push_str("\n             ");
                line.push_str(diag);
            }
            line
        }
        BuildEvent::UpToDate { task } => format!("       Fresh {}", task_label(task)),
        BuildEvent::VariantFileUnreadable { error } => {
            format!("error: {error}; continuing without variants")
        }
        BuildEvent::VariantSkipped { variant } => skipped_variant_line(variant, paths),
        BuildEvent::Shadowed { shadowed } => shadowed_line(shadowed, paths),
    }
}

/// Describes a rejected variant by its location in the variant file.
pub(crate) fn skipped_variant_line(variant: &SkippedVariant, paths: &ResolvedPaths) -> String {
    let file = paths
        .variants_file
        .as_deref()
        .map(|f| display_relative(f, &paths.project_dir))
        .unwrap_or_default();
    format!(
        "error: {file}:{}: {} -> {}: {}",
        variant.spec.line, variant.spec.source, variant.spec.output, variant.reason
    )
}

pub(crate) fn shadowed_line(shadowed: &ShadowedTask, paths: &ResolvedPaths) -> String {
    format!(
        "warning: {} is also written by {}, skipping {}",
        display_relative(&shadowed.task.target, &paths.target_root),
        key_label(&shadowed.winner),
        task_label(&shadowed.task)
    )
}

/// Source key plus macros, if any.
pub(crate) fn task_label(task: &CompileTask) -> String {
    key_label(&task.key)
}

fn key_label(key: &TaskKey) -> String {
    if key.macros.is_empty() {
        key.source.clone()
    } else {
        format!("{} {}", key.source, key.macros)
    }
}

fn summary_line(summary: &BuildSummary) -> String {
    format!(
        "    Finished {} compiled, {} failed, {} up-to-date in {:.3}s",
        summary.compiled,
        summary.failed,
        summary.up_to_date,
        summary.elapsed.as_secs_f64()
    )
}
