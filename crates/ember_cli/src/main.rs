//! Ember CLI, the command-line interface of the Ember build orchestrator.
//!
//! Provides `ember build` to compile out-of-date sources and relink the final
//! artifact, `ember plan` to show what a build would do without running any
//! tool, and `ember clean` to remove everything a build produces.

#![warn(missing_docs)]

mod build;
mod clean;
mod logging;
mod plan;
mod project;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ember_common::{Mode, Parameter};

/// Ember, an incremental two-phase build orchestrator.
#[derive(Parser, Debug)]
#[command(name = "ember", version, about = "Ember incremental build orchestrator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Path to a custom `ember.toml` configuration file or its directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile stale sources and relink the final artifact if needed.
    Build(BuildArgs),
    /// Show what a build would do without running any tool.
    Plan(PlanArgs),
    /// Remove intermediate objects and the final artifact.
    Clean(SelectArgs),
}

/// Settings shared by every command that selects what to build.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Which stages to run (overrides `build.mode`).
    #[arg(short, long, value_name = "compile|link|both")]
    pub mode: Option<Mode>,

    /// Final artifact of the link stage (overrides `build.target`).
    #[arg(short, long, value_name = "FILE")]
    pub target: Option<PathBuf>,

    /// Directory for intermediate objects (overrides `build.intermediate_dir`).
    #[arg(long, value_name = "DIR")]
    pub intermediate_dir: Option<PathBuf>,

    /// Compiler definition, repeatable (e.g. `-D Version=1.0`).
    #[arg(short = 'D', long = "define", value_name = "NAME=VALUE")]
    pub defines: Vec<Parameter>,
}

/// Arguments for the `ember build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Stage and target selection.
    #[command(flatten)]
    pub select: SelectArgs,

    /// Output format for the run report.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Keep going after a tool exits with a non-zero status.
    #[arg(short, long)]
    pub keep_going: bool,

    /// Append the tools' standard output to this file.
    #[arg(long, value_name = "FILE")]
    pub log_output: Option<PathBuf>,
}

/// Arguments for the `ember plan` subcommand.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Stage and target selection.
    #[command(flatten)]
    pub select: SelectArgs,

    /// Output format for the plan.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Plan(ref args) => plan::run(args, &global),
        Command::Clean(ref args) => clean::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }
}
