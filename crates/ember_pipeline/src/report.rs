//! Serializable summaries of pipeline runs and plans.

use std::path::PathBuf;

use ember_common::{Mode, ResolvedPathSet};
use ember_stale::Staleness;
use serde::Serialize;

use crate::compile::CompilePlan;
use crate::link::LinkPlan;
use crate::orchestrator::PipelineState;

/// What the compile stage did.
#[derive(Debug, Clone, Serialize)]
pub struct CompileReport {
    /// Sources passed to the compiler (empty if it was not run).
    pub stale_sources: Vec<PathBuf>,
    /// Every intermediate target, freshly built or already current.
    pub targets: ResolvedPathSet,
    /// Compiler exit code, if it was run.
    pub exit_code: Option<i32>,
}

impl CompileReport {
    /// Returns `true` if the compiler was run.
    pub fn invoked(&self) -> bool {
        self.exit_code.is_some()
    }
}

/// What the link stage did.
#[derive(Debug, Clone, Serialize)]
pub struct LinkReport {
    /// Files passed (or that would have been passed) to the linker.
    pub inputs: ResolvedPathSet,
    /// The final artifact.
    pub target: PathBuf,
    /// Staleness of the final artifact before linking.
    pub staleness: Staleness,
    /// Linker exit code, if it was run.
    pub exit_code: Option<i32>,
}

impl LinkReport {
    /// Returns `true` if the linker was run.
    pub fn invoked(&self) -> bool {
        self.exit_code.is_some()
    }
}

/// Summary of a completed pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// The mode the run used.
    pub mode: Mode,
    /// States visited, from `Idle` to `Done`.
    pub trace: Vec<PipelineState>,
    /// Resolved primary sources.
    pub sources: ResolvedPathSet,
    /// Resolved auxiliary sources.
    pub auxiliary: ResolvedPathSet,
    /// Compile stage outcome, if it ran.
    pub compile: Option<CompileReport>,
    /// Link stage outcome, if it ran.
    pub link: Option<LinkReport>,
}

impl PipelineReport {
    /// The state the run ended in.
    pub fn final_state(&self) -> PipelineState {
        self.trace.last().copied().unwrap_or(PipelineState::Idle)
    }
}

/// What a run would do, computed without invoking any tool.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    /// The mode planned for.
    pub mode: Mode,
    /// Resolved primary sources.
    pub sources: ResolvedPathSet,
    /// Resolved auxiliary sources.
    pub auxiliary: ResolvedPathSet,
    /// Compile decision, if the mode compiles.
    pub compile: Option<CompilePlan>,
    /// Link decision against the current files, if the mode links.
    pub link: Option<LinkPlan>,
}

impl PlanReport {
    /// Returns `true` if a run would invoke the compiler.
    pub fn would_compile(&self) -> bool {
        self.compile.as_ref().is_some_and(CompilePlan::has_stale)
    }

    /// Returns `true` if a run would invoke the linker.
    ///
    /// Recompiling refreshes targets, which in turn makes the artifact stale.
    pub fn would_link(&self) -> bool {
        match &self.link {
            Some(plan) => plan.staleness.is_stale() || self.would_compile(),
            None => false,
        }
    }
}
