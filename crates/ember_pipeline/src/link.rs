//! The link stage.
//!
//! The final artifact depends on every intermediate target and every auxiliary
//! source. It is relinked, in one tool call, only when it is missing or older
//! than one of them.

use std::path::{Path, PathBuf};

use ember_common::ResolvedPathSet;
use ember_config::PipelineConfig;
use ember_stale::{evaluate, Staleness};
use serde::Serialize;
use tracing::{debug, info};

use crate::compile::check_exit;
use crate::error::{PipelineError, ToolError};
use crate::invoker::{Invocation, ProcessInvoker};
use crate::report::LinkReport;

/// The link decision, before anything is run.
#[derive(Debug, Clone, Serialize)]
pub struct LinkPlan {
    /// Files passed to the linker.
    pub inputs: ResolvedPathSet,
    /// The final artifact.
    pub target: PathBuf,
    /// Whether, and why, the final artifact is out of date.
    pub staleness: Staleness,
}

/// Evaluates the final artifact against the link inputs and auxiliary sources.
pub fn plan_link(
    inputs: &ResolvedPathSet,
    auxiliary: &ResolvedPathSet,
    target: &Path,
) -> Result<LinkPlan, PipelineError> {
    let deps = inputs.union(auxiliary);
    let staleness = evaluate(target, deps.iter())?;
    debug!(target = %target.display(), ?staleness, "link check");
    Ok(LinkPlan {
        inputs: inputs.clone(),
        target: target.to_path_buf(),
        staleness,
    })
}

/// Builds the linker command: `/nologo`, every input, then `/out <target>`.
pub(crate) fn link_invocation(
    config: &PipelineConfig,
    plan: &LinkPlan,
) -> Result<Invocation, ToolError> {
    Ok(Invocation::new(&config.toolchain, config.toolchain.linker_path())
        .arg("/nologo")
        .path_args(plan.inputs.iter())?
        .arg("/out")
        .path_args([plan.target.as_path()])?
        .output(config.output_log.clone()))
}

/// Runs the link stage.
///
/// Skipping because the artifact is current is not an error. A non-zero exit
/// is handled the same way as in the compile stage.
pub fn link(
    config: &PipelineConfig,
    inputs: &ResolvedPathSet,
    auxiliary: &ResolvedPathSet,
    target: &Path,
    invoker: &dyn ProcessInvoker,
) -> Result<LinkReport, PipelineError> {
    let plan = plan_link(inputs, auxiliary, target)?;
    if !plan.staleness.is_stale() {
        info!(target = %target.display(), "final artifact is up to date");
        return Ok(LinkReport {
            inputs: plan.inputs,
            target: plan.target,
            staleness: plan.staleness,
            exit_code: None,
        });
    }

    let inv = link_invocation(config, &plan)?;
    info!(inputs = plan.inputs.len(), target = %target.display(), "linking");
    let code = invoker.run(&inv)?;
    check_exit(config, &inv, code)?;

    Ok(LinkReport {
        inputs: plan.inputs,
        target: plan.target,
        staleness: plan.staleness,
        exit_code: Some(code),
    })
}
