//! Error types for staleness evaluation.

use std::path::PathBuf;

/// Errors that can occur while deriving targets or reading timestamps.
///
/// A missing file is not an error: missing targets are stale and missing
/// dependencies carry no timestamp.
#[derive(Debug, thiserror::Error)]
pub enum StaleError {
    /// Reading file metadata failed for a reason other than absence.
    #[error("cannot read modification time of {path}: {source}")]
    Io {
        /// The path whose metadata could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A source path has no file name to derive a target from.
    #[error("cannot derive a target name from {0}")]
    NoFileName(PathBuf),

    /// Two distinct sources derive the same intermediate target.
    #[error("sources {first} and {second} both derive intermediate target {target}")]
    TargetCollision {
        /// The shared derived target.
        target: PathBuf,
        /// The first source mapping to `target`.
        first: PathBuf,
        /// The second source mapping to `target`.
        second: PathBuf,
    },
}
