//! `shaderbake list`: show compile tasks and their status.

use shaderbake_build::{Builder, PlannedTask, SystemRunner, TaskStatus};
use shaderbake_cache::JsonFileStore;
use shaderbake_config::ResolvedPaths;

use crate::build::{shadowed_line, skipped_variant_line, task_label};
use crate::project::{display_relative, load_project};
use crate::GlobalArgs;

/// Runs the `shaderbake list` command.
///
/// Prints one line per task to stdout. Returns exit code 1 if the variant
/// file is unreadable or a declaration in it was rejected.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let mut store = JsonFileStore::new(&project.paths.cache_file);
    let builder = Builder::new(&project.paths, &project.config, &mut store, SystemRunner);
    let plan = builder.plan()?;

    for planned in &plan.tasks {
        println!("{}", task_line(planned, &project.paths));
    }
    if let Some(ref error) = plan.variants_error {
        eprintln!("error: {error}");
    }
    for variant in &plan.skipped_variants {
        eprintln!("{}", skipped_variant_line(variant, &project.paths));
    }
    if !global.quiet {
        for shadowed in &plan.shadowed {
            eprintln!("{}", shadowed_line(shadowed, &project.paths));
        }
    }

    if !global.quiet {
        let stale = plan
            .tasks
            .iter()
            .filter(|t| !t.status.is_up_to_date())
            .count();
        eprintln!("   {} task(s), {stale} stale", plan.tasks.len());
    }

    if plan.variants_error.is_none() && plan.skipped_variants.is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn task_line(planned: &PlannedTask, paths: &ResolvedPaths) -> String {
    let status = match planned.status {
        TaskStatus::UpToDate => "fresh".to_string(),
        TaskStatus::Stale(reason) => format!("stale ({reason})"),
    };
    format!(
        "{:<24} {} -> {}",
        status,
        task_label(&planned.task),
        display_relative(&planned.task.target, &paths.target_root)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaderbake_build::{CompileTask, MacroSet, StaleReason, TaskKey};
    use shaderbake_config::{resolve_paths, ToolConfig};
    use std::path::{Path, PathBuf};

    fn planned(status: TaskStatus) -> PlannedTask {
        PlannedTask {
            task: CompileTask {
                key: TaskKey {
                    source: "a.vert".to_string(),
                    macros: MacroSet::new(),
                },
                source: PathBuf::from("/proj/shaders/a.vert"),
                target: PathBuf::from("/proj/assets/shaders/a.vert.spv"),
            },
            status,
        }
    }

    #[test]
    fn fresh_line() {
        let paths = resolve_paths(&ToolConfig::default(), Path::new("/proj"));
        let line = task_line(&planned(TaskStatus::UpToDate), &paths);
        assert!(line.starts_with("fresh "));
        assert!(line.ends_with("a.vert -> a.vert.spv"));
    }

    #[test]
    fn stale_line_includes_reason() {
        let paths = resolve_paths(&ToolConfig::default(), Path::new("/proj"));
        let line = task_line(
            &planned(TaskStatus::Stale(StaleReason::MissingArtifact)),
            &paths,
        );
        assert!(line.starts_with("stale (artifact missing)"));
    }
}
