//! The compile stage.
//!
//! Every primary source maps to one intermediate target. Sources whose target
//! is missing or older than the source (or than any auxiliary source) are
//! compiled together in a single tool call; the stage always reports the
//! complete target set because linking needs all of it.

use std::path::PathBuf;

use ember_common::ResolvedPathSet;
use ember_config::PipelineConfig;
use ember_stale::{evaluate, newest, Staleness, TargetDeriver};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{PipelineError, ToolError};
use crate::invoker::{Invocation, ProcessInvoker};
use crate::report::CompileReport;

/// A primary source that has to be recompiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleSource {
    /// The source file.
    pub source: PathBuf,
    /// Its derived intermediate target.
    pub target: PathBuf,
    /// Why the target is out of date.
    pub staleness: Staleness,
}

/// The compile decision for a set of sources, before anything is run.
#[derive(Debug, Clone, Serialize)]
pub struct CompilePlan {
    /// Every derived target, stale or not.
    pub targets: ResolvedPathSet,
    /// Sources that need compiling, in source order.
    pub stale: Vec<StaleSource>,
    /// Sources whose targets are current.
    pub fresh: Vec<PathBuf>,
}

impl CompilePlan {
    /// Returns `true` if at least one source must be compiled.
    pub fn has_stale(&self) -> bool {
        !self.stale.is_empty()
    }
}

/// Partitions `sources` into stale and fresh by comparing each derived target
/// against its source and the auxiliary set.
pub fn plan_compile(
    deriver: &TargetDeriver,
    sources: &ResolvedPathSet,
    auxiliary: &ResolvedPathSet,
) -> Result<CompilePlan, PipelineError> {
    let pairs = deriver.derive_all(sources)?;
    // Only the newest auxiliary file can make a target stale, so stat the set once.
    let newest_aux = newest(auxiliary.iter())?.map(|(path, _)| path);

    let mut targets = ResolvedPathSet::new();
    let mut stale = Vec::new();
    let mut fresh = Vec::new();
    for (source, target) in pairs {
        let deps = std::iter::once(source.as_path()).chain(newest_aux.as_deref());
        let staleness = evaluate(&target, deps)?;
        debug!(
            source = %source.display(),
            target = %target.display(),
            ?staleness,
            "compile check"
        );
        targets.insert(target.clone());
        if staleness.is_stale() {
            stale.push(StaleSource {
                source,
                target,
                staleness,
            });
        } else {
            fresh.push(source);
        }
    }

    Ok(CompilePlan {
        targets,
        stale,
        fresh,
    })
}

/// Builds the compiler command: `/nologo`, the stale sources, then one
/// `-d<name>=<value>` per parameter.
pub(crate) fn compile_invocation(
    config: &PipelineConfig,
    stale: &[StaleSource],
) -> Result<Invocation, ToolError> {
    let flags = config.parameters.iter().map(|p| p.to_flag());
    let mut inv = Invocation::new(&config.toolchain, config.toolchain.compiler_path())
        .arg("/nologo")
        .path_args(stale.iter().map(|s| s.source.as_path()))?
        .working_dir(config.intermediate_dir.clone())
        .output(config.output_log.clone());
    inv.args.extend(flags);
    Ok(inv)
}

/// Runs the compile stage.
///
/// Invokes the compiler at most once, with every stale source. A non-zero exit
/// is fatal unless `config.fail_on_error` is off, in which case it is logged
/// and recorded in the report.
pub fn compile(
    config: &PipelineConfig,
    deriver: &TargetDeriver,
    sources: &ResolvedPathSet,
    auxiliary: &ResolvedPathSet,
    invoker: &dyn ProcessInvoker,
) -> Result<CompileReport, PipelineError> {
    let plan = plan_compile(deriver, sources, auxiliary)?;
    let stale_sources: Vec<PathBuf> = plan.stale.iter().map(|s| s.source.clone()).collect();

    if !plan.has_stale() {
        info!(targets = plan.targets.len(), "all intermediate targets are up to date");
        return Ok(CompileReport {
            stale_sources,
            targets: plan.targets,
            exit_code: None,
        });
    }

    let inv = compile_invocation(config, &plan.stale)?;
    if let Some(dir) = &inv.working_dir {
        std::fs::create_dir_all(dir).map_err(|source| ToolError::Prepare {
            program: inv.tool.clone(),
            path: dir.clone(),
            source,
        })?;
    }

    info!(
        stale = plan.stale.len(),
        total = plan.targets.len(),
        "compiling out-of-date sources"
    );
    let code = invoker.run(&inv)?;
    check_exit(config, &inv, code)?;

    Ok(CompileReport {
        stale_sources,
        targets: plan.targets,
        exit_code: Some(code),
    })
}

/// Turns a non-zero exit into an error unless failures are tolerated.
pub(crate) fn check_exit(
    config: &PipelineConfig,
    inv: &Invocation,
    code: i32,
) -> Result<(), ToolError> {
    if code == 0 {
        return Ok(());
    }
    if config.fail_on_error {
        return Err(ToolError::Failed {
            program: inv.tool.clone(),
            code,
        });
    }
    warn!(tool = %inv.tool.display(), code, "tool failed, continuing");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{touch, Recorder};
    use ember_common::Parameter;
    use std::path::Path;

    fn setup() -> (tempfile::TempDir, PipelineConfig, TargetDeriver) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PipelineConfig::new(dir.path());
        config.intermediate_dir = Some(dir.path().join("obj"));
        config.toolchain.object_extension = "fsobj".to_string();
        let deriver = TargetDeriver::new(
            config.intermediate_dir.as_deref(),
            dir.path(),
            &config.toolchain.object_extension,
        );
        (dir, config, deriver)
    }

    fn set(paths: &[&Path]) -> ResolvedPathSet {
        paths.iter().map(|p| p.to_path_buf()).collect()
    }

    #[test]
    fn missing_targets_are_all_compiled_in_one_call() {
        let (dir, config, deriver) = setup();
        let a = touch(&dir.path().join("a.fs"), 0);
        let b = touch(&dir.path().join("b.fs"), 0);
        let recorder = Recorder::new();

        let report = compile(&config, &deriver, &set(&[&a, &b]), &set(&[]), &recorder).unwrap();

        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].args,
            vec![
                "/nologo".to_string(),
                a.to_string_lossy().into_owned(),
                b.to_string_lossy().into_owned()
            ]
        );
        assert_eq!(calls[0].working_dir, config.intermediate_dir);
        assert!(dir.path().join("obj").is_dir());
        assert_eq!(report.stale_sources, vec![a, b]);
        assert_eq!(report.targets.len(), 2);
        assert_eq!(report.exit_code, Some(0));
    }

    #[test]
    fn fresh_targets_mean_no_invocation() {
        let (dir, config, deriver) = setup();
        let a = touch(&dir.path().join("a.fs"), 0);
        std::fs::create_dir_all(dir.path().join("obj")).unwrap();
        touch(&dir.path().join("obj/a.fsobj"), 10);
        let recorder = Recorder::new();

        let report = compile(&config, &deriver, &set(&[&a]), &set(&[]), &recorder).unwrap();

        assert!(recorder.calls().is_empty());
        assert!(report.stale_sources.is_empty());
        assert!(report.targets.contains(&dir.path().join("obj/a.fsobj")));
        assert_eq!(report.exit_code, None);
    }

    #[test]
    fn newer_auxiliary_source_makes_every_target_stale() {
        let (dir, _config, deriver) = setup();
        std::fs::create_dir_all(dir.path().join("obj")).unwrap();
        let a = touch(&dir.path().join("a.fs"), 0);
        let b = touch(&dir.path().join("b.fs"), 0);
        touch(&dir.path().join("obj/a.fsobj"), 10);
        touch(&dir.path().join("obj/b.fsobj"), 10);
        let inc = touch(&dir.path().join("common.fsi"), 20);

        let plan = plan_compile(&deriver, &set(&[&a, &b]), &set(&[&inc])).unwrap();
        assert_eq!(plan.stale.len(), 2);
        assert_eq!(plan.stale[0].staleness, Staleness::OlderThan(inc.clone()));
        assert!(plan.fresh.is_empty());
    }

    #[test]
    fn only_changed_source_is_stale() {
        let (dir, _config, deriver) = setup();
        std::fs::create_dir_all(dir.path().join("obj")).unwrap();
        let a = touch(&dir.path().join("a.fs"), 30);
        let b = touch(&dir.path().join("b.fs"), 0);
        touch(&dir.path().join("obj/a.fsobj"), 10);
        touch(&dir.path().join("obj/b.fsobj"), 10);

        let plan = plan_compile(&deriver, &set(&[&a, &b]), &set(&[])).unwrap();
        assert_eq!(plan.stale.len(), 1);
        assert_eq!(plan.stale[0].source, a);
        assert_eq!(plan.fresh, vec![b]);
        assert_eq!(plan.targets.len(), 2);
    }

    #[test]
    fn parameters_follow_sources_in_order() {
        let (dir, mut config, deriver) = setup();
        config.parameters = vec![Parameter::new("Zeta", "1"), Parameter::new("Alpha", "2")];
        let a = touch(&dir.path().join("a.fs"), 0);
        let recorder = Recorder::new();

        compile(&config, &deriver, &set(&[&a]), &set(&[]), &recorder).unwrap();

        let args = &recorder.calls()[0].args;
        assert_eq!(&args[2..], &["-dZeta=1".to_string(), "-dAlpha=2".to_string()]);
    }

    #[test]
    fn non_zero_exit_is_fatal_by_default() {
        let (dir, config, deriver) = setup();
        let a = touch(&dir.path().join("a.fs"), 0);
        let recorder = Recorder::exiting_with(1);

        let err = compile(&config, &deriver, &set(&[&a]), &set(&[]), &recorder).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ToolInvocation(ToolError::Failed { code: 1, .. })
        ));
    }

    #[test]
    fn non_zero_exit_tolerated_when_asked() {
        let (dir, mut config, deriver) = setup();
        config.fail_on_error = false;
        let a = touch(&dir.path().join("a.fs"), 0);
        let recorder = Recorder::exiting_with(4);

        let report = compile(&config, &deriver, &set(&[&a]), &set(&[]), &recorder).unwrap();
        assert_eq!(report.exit_code, Some(4));
    }

    #[test]
    fn colliding_sources_are_rejected_before_running() {
        let (dir, config, deriver) = setup();
        std::fs::create_dir_all(dir.path().join("x")).unwrap();
        std::fs::create_dir_all(dir.path().join("y")).unwrap();
        let a = touch(&dir.path().join("x/a.fs"), 0);
        let b = touch(&dir.path().join("y/a.fs"), 0);
        let recorder = Recorder::new();

        let err = compile(&config, &deriver, &set(&[&a, &b]), &set(&[]), &recorder).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Configuration(ember_config::ConfigError::TargetCollision { .. })
        ));
        assert!(recorder.calls().is_empty());
    }
}
