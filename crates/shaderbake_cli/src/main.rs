//! Shaderbake CLI: incremental shader builds.
//!
//! Provides `shaderbake build` to compile every stale shader task and
//! `shaderbake list` to show which tasks are stale without compiling.

#![warn(missing_docs)]

mod build;
mod list;
mod project;

use std::process;

use clap::{Parser, Subcommand};

/// Shaderbake: compile only the shaders that changed.
#[derive(Parser, Debug)]
#[command(name = "shaderbake", version, about = "Incremental shader build tool")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `shaderbake.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile every shader whose sources or macros changed.
    Build(BuildArgs),
    /// List compile tasks and whether they are up to date.
    List,
}

/// Arguments for the `shaderbake build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Ignore the build cache and compile everything.
    #[arg(short, long)]
    pub force: bool,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::List => list::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the logger. `RUST_LOG` takes precedence over the CLI flags.
fn init_logging(global: &GlobalArgs) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(global)),
    )
    .format_timestamp(None)
    .init();
}

fn default_log_filter(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    }
}
