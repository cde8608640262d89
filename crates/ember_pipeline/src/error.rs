//! Error taxonomy of a pipeline run.

use std::path::PathBuf;

use ember_config::ConfigError;
use ember_stale::StaleError;

use crate::orchestrator::PipelineState;

/// Failure of the filesystem scanner while expanding a file set.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The base directory of a file set does not exist.
    #[error("file set directory {0} does not exist")]
    MissingDir(PathBuf),

    /// An include or exclude pattern is not a valid glob.
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        /// The rejected pattern.
        pattern: String,
        /// The underlying glob error.
        source: glob::PatternError,
    },

    /// Walking the directory tree failed.
    #[error("failed to scan {path}: {source}")]
    Walk {
        /// Base directory being scanned.
        path: PathBuf,
        /// The underlying walk error.
        source: walkdir::Error,
    },
}

/// Failure to run an external tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The tool could not be started (missing executable, permissions).
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// The program that could not be started.
        program: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The tool ran and exited with a non-zero status.
    #[error("{program} exited with status {code}")]
    Failed {
        /// The program that failed.
        program: PathBuf,
        /// Its exit status (-1 if terminated by a signal).
        code: i32,
    },

    /// A file argument is not valid UTF-8 and cannot be passed on unaltered.
    #[error("path {} is not valid UTF-8", .0.display())]
    NonUtf8Path(PathBuf),

    /// The working directory or output file for the tool could not be prepared.
    #[error("failed to prepare {path} for {program}: {source}")]
    Prepare {
        /// The program being prepared.
        program: PathBuf,
        /// The directory or file that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Any error that aborts a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Invalid or incomplete configuration; no tool was run.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A file set could not be expanded; no tool was run.
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolveError),

    /// An external tool could not be run or failed.
    #[error("tool invocation error: {0}")]
    ToolInvocation(#[from] ToolError),

    /// A timestamp could not be read.
    #[error("staleness check failed: {0}")]
    Staleness(StaleError),

    /// A generated file could not be removed.
    #[error("failed to remove {path}: {source}")]
    Remove {
        /// The file that could not be removed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl From<StaleError> for PipelineError {
    fn from(err: StaleError) -> Self {
        match err {
            StaleError::TargetCollision {
                target,
                first,
                second,
            } => PipelineError::Configuration(ConfigError::TargetCollision {
                target,
                first,
                second,
            }),
            other => PipelineError::Staleness(other),
        }
    }
}

/// A pipeline run that ended in [`PipelineState::Failed`].
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct PipelineFailure {
    /// The state the pipeline was in when the error occurred.
    pub failed_in: PipelineState,
    /// Every state visited, ending with `Failed`.
    pub trace: Vec<PipelineState>,
    /// The error that aborted the run.
    #[source]
    pub error: PipelineError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_maps_to_configuration_error() {
        let err: PipelineError = StaleError::TargetCollision {
            target: PathBuf::from("/obj/x.wixobj"),
            first: PathBuf::from("/a/x.wxs"),
            second: PathBuf::from("/b/x.wxs"),
        }
        .into();
        assert!(matches!(
            err,
            PipelineError::Configuration(ConfigError::TargetCollision { .. })
        ));
    }

    #[test]
    fn other_stale_errors_stay_staleness() {
        let err: PipelineError = StaleError::NoFileName(PathBuf::from("/")).into();
        assert!(matches!(err, PipelineError::Staleness(_)));
    }

    #[test]
    fn tool_failed_display() {
        let err = ToolError::Failed {
            program: PathBuf::from("candle.exe"),
            code: 2,
        };
        assert_eq!(err.to_string(), "candle.exe exited with status 2");
    }

    #[test]
    fn pipeline_error_prefixes_kind() {
        let err = PipelineError::from(ConfigError::NoSources);
        assert_eq!(
            err.to_string(),
            "configuration error: you must specify at least one source file"
        );
    }

    #[test]
    fn failure_displays_inner_error() {
        let failure = PipelineFailure {
            failed_in: PipelineState::Idle,
            trace: vec![PipelineState::Idle, PipelineState::Failed],
            error: ConfigError::NoSources.into(),
        };
        assert!(failure.to_string().starts_with("configuration error"));
    }
}
