//! `ember plan`: show what a build would do.

use ember_pipeline::{GlobScanner, Pipeline, PlanReport};
use tracing::error;

use crate::build::display;
use crate::project::{self, Project};
use crate::{GlobalArgs, PlanArgs, ReportFormat};

/// Runs the `ember plan` command. No tool is invoked.
pub fn run(args: &PlanArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let Project { cwd, config } = project::load(global, &args.select, false, None)?;

    let pipeline = Pipeline::new(&config, &GlobScanner).current_dir(&cwd);
    let plan = match pipeline.plan() {
        Ok(plan) => plan,
        Err(failure) => {
            error!(state = %failure.failed_in, "planning failed: {}", failure.error);
            return Ok(1);
        }
    };

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        ReportFormat::Text => print_plan(&plan, &cwd),
    }
    Ok(0)
}

fn print_plan(plan: &PlanReport, cwd: &std::path::Path) {
    if let Some(compile) = &plan.compile {
        if compile.has_stale() {
            println!("compile {} of {} source(s):", compile.stale.len(), plan.sources.len());
            for stale in &compile.stale {
                println!("  {}", display(&stale.source, cwd));
            }
        } else {
            println!("compile: nothing to do");
        }
    }

    if let Some(link) = &plan.link {
        if plan.would_link() {
            println!("link {}", display(&link.target, cwd));
        } else {
            println!("link: {} is up to date", display(&link.target, cwd));
        }
    }
}
