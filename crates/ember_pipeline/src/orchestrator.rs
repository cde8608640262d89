//! Sequencing of resolution, compile, and link.
//!
//! A [`Pipeline`] is built around one immutable [`PipelineConfig`] and walks
//! the states `Idle → Resolving → Compiling → Linking → Done`, skipping the
//! stages the mode excludes. The first error moves it to `Failed` and aborts.

use std::fmt;
use std::path::{Path, PathBuf};

use ember_common::{normalize, ResolvedPathSet, SourceDescriptor};
use ember_config::{ConfigError, PipelineConfig};
use ember_stale::TargetDeriver;
use serde::Serialize;
use tracing::{debug, info};

use crate::compile::{compile, plan_compile};
use crate::error::{PipelineError, PipelineFailure};
use crate::invoker::ProcessInvoker;
use crate::link::{link, plan_link};
use crate::report::{PipelineReport, PlanReport};
use crate::resolver::SourceResolver;
use crate::scanner::FileScanner;

/// A state of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Nothing has happened yet; preconditions are checked here.
    Idle,
    /// Descriptors are being expanded into files.
    Resolving,
    /// The compile stage is running.
    Compiling,
    /// The link stage is running.
    Linking,
    /// The run completed.
    Done,
    /// The run was aborted.
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Compiling => "compiling",
            Self::Linking => "linking",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One configured pipeline, ready to run, plan, or clean.
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    scanner: &'a dyn FileScanner,
    cwd: PathBuf,
}

struct Resolved {
    sources: ResolvedPathSet,
    auxiliary: ResolvedPathSet,
}

/// The configuration of one run after validation, with every path absolute.
struct Prepared {
    config: PipelineConfig,
    cwd: PathBuf,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline. Intermediate targets are rooted at the project root
    /// unless an intermediate directory or [`current_dir`](Self::current_dir)
    /// says otherwise.
    pub fn new(config: &'a PipelineConfig, scanner: &'a dyn FileScanner) -> Self {
        Self {
            config,
            scanner,
            cwd: config.project_root.clone(),
        }
    }

    /// Sets the directory intermediate targets fall back to when no
    /// intermediate directory is configured.
    pub fn current_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Runs every stage the mode selects, starting tools through `invoker`.
    pub fn run(&self, invoker: &dyn ProcessInvoker) -> Result<PipelineReport, PipelineFailure> {
        let mut trace = vec![PipelineState::Idle];
        match self.run_stages(invoker, &mut trace) {
            Ok(mut report) => {
                enter(&mut trace, PipelineState::Done);
                report.trace = trace;
                Ok(report)
            }
            Err(error) => Err(fail(trace, error)),
        }
    }

    fn run_stages(
        &self,
        invoker: &dyn ProcessInvoker,
        trace: &mut Vec<PipelineState>,
    ) -> Result<PipelineReport, PipelineError> {
        let run = self.prepare()?;
        let config = &run.config;

        enter(trace, PipelineState::Resolving);
        let Resolved { sources, auxiliary } = self.resolve(&run)?;

        let mut report = PipelineReport {
            mode: config.mode,
            trace: Vec::new(),
            sources,
            auxiliary,
            compile: None,
            link: None,
        };

        let link_inputs = if config.mode.compiles() {
            enter(trace, PipelineState::Compiling);
            let compiled = compile(
                config,
                &run.deriver(),
                &report.sources,
                &report.auxiliary,
                invoker,
            )?;
            let targets = compiled.targets.clone();
            report.compile = Some(compiled);
            targets
        } else {
            report.sources.clone()
        };

        if config.mode.links() {
            enter(trace, PipelineState::Linking);
            report.link = Some(link(
                config,
                &link_inputs,
                &report.auxiliary,
                run.final_artifact()?,
                invoker,
            )?);
        }

        Ok(report)
    }

    /// Resolves and evaluates staleness. No tool can be started from here.
    ///
    /// The link decision reflects the files as they are now; use
    /// [`PlanReport::would_link`] to account for a pending recompile.
    pub fn plan(&self) -> Result<PlanReport, PipelineFailure> {
        let mut trace = vec![PipelineState::Idle];
        self.plan_stages(&mut trace).map_err(|error| fail(trace, error))
    }

    fn plan_stages(&self, trace: &mut Vec<PipelineState>) -> Result<PlanReport, PipelineError> {
        let run = self.prepare()?;
        let mode = run.config.mode;

        enter(trace, PipelineState::Resolving);
        let Resolved { sources, auxiliary } = self.resolve(&run)?;

        let compile = if mode.compiles() {
            enter(trace, PipelineState::Compiling);
            Some(plan_compile(&run.deriver(), &sources, &auxiliary)?)
        } else {
            None
        };

        let link = if mode.links() {
            enter(trace, PipelineState::Linking);
            let inputs = match &compile {
                Some(plan) => &plan.targets,
                None => &sources,
            };
            Some(plan_link(inputs, &auxiliary, run.final_artifact()?)?)
        } else {
            None
        };

        Ok(PlanReport {
            mode,
            sources,
            auxiliary,
            compile,
            link,
        })
    }

    /// Removes the intermediate targets and final artifact this configuration
    /// produces, returning the files that were deleted.
    ///
    /// Only derived targets are touched; sources and unrelated files in the
    /// intermediate directory are left alone.
    pub fn clean(&self) -> Result<Vec<PathBuf>, PipelineFailure> {
        let mut trace = vec![PipelineState::Idle];
        self.clean_files(&mut trace).map_err(|error| fail(trace, error))
    }

    fn clean_files(&self, trace: &mut Vec<PipelineState>) -> Result<Vec<PathBuf>, PipelineError> {
        let run = self.prepare()?;
        let mode = run.config.mode;

        enter(trace, PipelineState::Resolving);
        let Resolved { sources, .. } = self.resolve(&run)?;

        let mut doomed = Vec::new();
        if mode.compiles() {
            doomed.extend(
                run.deriver()
                    .derive_all(&sources)?
                    .into_iter()
                    .map(|(_, target)| target),
            );
        }
        if mode.links() {
            doomed.push(run.final_artifact()?.to_path_buf());
        }

        let mut removed = Vec::new();
        for path in doomed {
            if !path.is_file() {
                continue;
            }
            std::fs::remove_file(&path).map_err(|source| PipelineError::Remove {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), "removed");
            removed.push(path);
        }
        Ok(removed)
    }

    /// Checks the configuration and makes every path in it absolute.
    ///
    /// Runs in `Idle`: nothing here walks the source tree.
    fn prepare(&self) -> Result<Prepared, ConfigError> {
        let config = self.config;
        if !config.has_sources() {
            return Err(ConfigError::NoSources);
        }
        if config.mode.links() && config.target.is_none() {
            return Err(ConfigError::MissingTarget(config.mode));
        }

        let config = config.anchored()?;
        if let Some(source) = &config.source {
            if !source.is_file() {
                return Err(ConfigError::MissingSource(source.clone()));
            }
        }
        let cwd = std::path::absolute(&self.cwd)
            .map(|p| normalize(&p))
            .map_err(|source| ConfigError::Absolute {
                path: self.cwd.clone(),
                source,
            })?;
        Ok(Prepared { config, cwd })
    }

    fn resolve(&self, run: &Prepared) -> Result<Resolved, PipelineError> {
        let config = &run.config;
        let resolver = SourceResolver::new(self.scanner, &config.project_root);

        let mut primary = config.sources.clone();
        if let Some(source) = &config.source {
            primary.push(SourceDescriptor::file(source.clone()));
        }
        let sources = resolver.resolve_required(&primary)?;
        let auxiliary = resolver.resolve(&config.more_sources)?;
        info!(
            sources = sources.len(),
            auxiliary = auxiliary.len(),
            "resolved sources"
        );
        Ok(Resolved { sources, auxiliary })
    }
}

impl Prepared {
    fn deriver(&self) -> TargetDeriver {
        TargetDeriver::new(
            self.config.intermediate_dir.as_deref(),
            &self.cwd,
            &self.config.toolchain.object_extension,
        )
    }

    fn final_artifact(&self) -> Result<&Path, ConfigError> {
        self.config
            .target
            .as_deref()
            .ok_or(ConfigError::MissingTarget(self.config.mode))
    }
}

fn enter(trace: &mut Vec<PipelineState>, state: PipelineState) {
    debug!(%state, "entering state");
    trace.push(state);
}

fn fail(mut trace: Vec<PipelineState>, error: PipelineError) -> PipelineFailure {
    let failed_in = trace.last().copied().unwrap_or(PipelineState::Idle);
    trace.push(PipelineState::Failed);
    PipelineFailure {
        failed_in,
        trace,
        error,
    }
}
