//! `ember clean`: remove what a build produces.

use ember_pipeline::{GlobScanner, Pipeline};
use tracing::error;

use crate::build::display;
use crate::project::{self, Project};
use crate::{GlobalArgs, SelectArgs};

/// Runs the `ember clean` command.
pub fn run(args: &SelectArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let Project { cwd, config } = project::load(global, args, false, None)?;

    let pipeline = Pipeline::new(&config, &GlobScanner).current_dir(&cwd);
    match pipeline.clean() {
        Ok(removed) => {
            if !global.quiet {
                for path in &removed {
                    println!("    Removed {}", display(path, &cwd));
                }
                println!("    Cleaned {} file(s)", removed.len());
            }
            Ok(0)
        }
        Err(failure) => {
            error!(state = %failure.failed_in, "clean failed: {}", failure.error);
            Ok(1)
        }
    }
}
