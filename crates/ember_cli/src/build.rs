//! `ember build`: compile out-of-date sources, then relink if needed.

use std::path::Path;

use ember_pipeline::{GlobScanner, Pipeline, PipelineReport, SystemInvoker};
use tracing::error;

use crate::project::{self, Project};
use crate::{BuildArgs, GlobalArgs, ReportFormat};

/// Runs the `ember build` command.
///
/// Returns exit code 0 when the run reaches `Done`, 1 when it fails.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let Project { cwd, config } =
        project::load(global, &args.select, args.keep_going, args.log_output.clone())?;

    let pipeline = Pipeline::new(&config, &GlobScanner).current_dir(&cwd);
    match pipeline.run(&SystemInvoker) {
        Ok(report) => {
            match args.format {
                ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                ReportFormat::Text => {
                    if !global.quiet {
                        print_summary(&report, &cwd, global.verbose);
                    }
                }
            }
            Ok(0)
        }
        Err(failure) => {
            error!(state = %failure.failed_in, "build failed: {}", failure.error);
            if args.format == ReportFormat::Json {
                let body = serde_json::json!({
                    "failed_in": failure.failed_in,
                    "trace": failure.trace,
                    "error": failure.error.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            Ok(1)
        }
    }
}

fn print_summary(report: &PipelineReport, cwd: &Path, verbose: bool) {
    if let Some(compile) = &report.compile {
        if compile.invoked() {
            println!(
                "   Compiled {} of {} source(s)",
                compile.stale_sources.len(),
                report.sources.len()
            );
            if verbose {
                for source in &compile.stale_sources {
                    println!("            {}", display(source, cwd));
                }
            }
        } else {
            println!("   Up to date, {} object(s)", compile.targets.len());
        }
        if let Some(code) = compile.exit_code.filter(|c| *c != 0) {
            println!("    Warning compiler exited with status {code}");
        }
    }

    if let Some(link) = &report.link {
        if link.invoked() {
            println!("     Linked {}", display(&link.target, cwd));
        } else {
            println!("   Up to date {}", display(&link.target, cwd));
        }
        if let Some(code) = link.exit_code.filter(|c| *c != 0) {
            println!("    Warning linker exited with status {code}");
        }
    }
}

/// Shows `path` relative to `cwd` when it lies below it.
pub fn display(path: &Path, cwd: &Path) -> String {
    path.strip_prefix(cwd)
        .unwrap_or(path)
        .display()
        .to_string()
}
