//! Error types for configuration loading and validation.

use std::path::PathBuf;

use ember_common::Mode;

/// Errors that can occur when loading, resolving, or validating a build configuration.
///
/// All of these are reported before any external tool is invoked.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A relative path could not be made absolute because the current
    /// directory is unavailable.
    #[error("cannot make {} absolute: {source}", .path.display())]
    Absolute {
        /// The relative path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// No `ember.toml` was found in the start directory or any parent.
    #[error("could not find ember.toml in {} or any parent directory", .0.display())]
    ProjectNotFound(PathBuf),

    /// A required field is missing from the configuration.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Neither a single source nor any source file set was configured.
    #[error("you must specify at least one source file")]
    NoSources,

    /// Source descriptors were configured but resolved to no files.
    #[error("source descriptors matched no files")]
    EmptySourceSet,

    /// The explicitly configured source file does not exist.
    #[error("source file {} doesn't exist", .0.display())]
    MissingSource(PathBuf),

    /// The mode requires linking but no final artifact was configured.
    #[error("a target is required when running in '{0}' mode")]
    MissingTarget(Mode),

    /// Two primary sources derive the same intermediate target.
    #[error(
        "sources {} and {} both derive intermediate target {}",
        .first.display(),
        .second.display(),
        .target.display()
    )]
    TargetCollision {
        /// The shared derived target.
        target: PathBuf,
        /// The first source mapping to `target`.
        first: PathBuf,
        /// The second source mapping to `target`.
        second: PathBuf,
    },
}
