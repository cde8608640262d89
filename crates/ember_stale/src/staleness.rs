//! Modification-time staleness checks.
//!
//! A target is stale when it does not exist or when its modification time is
//! strictly earlier than that of any dependency. Dependencies that do not exist
//! have no timestamp and never make a target stale. Timestamps are compared at
//! whatever resolution the filesystem reports; clock skew is not corrected.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use crate::error::StaleError;

/// Outcome of evaluating one target against its dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "dependency", rename_all = "snake_case")]
pub enum Staleness {
    /// The target does not exist.
    Missing,
    /// The target is older than this dependency.
    OlderThan(PathBuf),
    /// The target is at least as new as every dependency.
    Fresh,
}

impl Staleness {
    /// Returns `true` if the target has to be rebuilt.
    pub fn is_stale(&self) -> bool {
        !matches!(self, Staleness::Fresh)
    }
}

/// Reads the modification time of `path`, or `None` if it does not exist.
pub fn modified_time(path: &Path) -> Result<Option<SystemTime>, StaleError> {
    let io_err = |source: std::io::Error| StaleError::Io {
        path: path.to_path_buf(),
        source,
    };
    match std::fs::metadata(path) {
        Ok(meta) => meta.modified().map(Some).map_err(io_err),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(e)),
    }
}

/// Finds the most recently modified of `paths`, skipping ones that don't exist.
///
/// Lets a caller stat a shared dependency set once instead of once per target.
pub fn newest<'a, I>(paths: I) -> Result<Option<(PathBuf, SystemTime)>, StaleError>
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut newest: Option<(PathBuf, SystemTime)> = None;
    for path in paths {
        if let Some(time) = modified_time(path)? {
            if newest.as_ref().map_or(true, |(_, t)| time > *t) {
                newest = Some((path.to_path_buf(), time));
            }
        }
    }
    Ok(newest)
}

/// Evaluates `target` against a set of dependencies.
///
/// The first dependency found to be newer than the target is reported.
pub fn evaluate<'a, I>(target: &Path, dependencies: I) -> Result<Staleness, StaleError>
where
    I: IntoIterator<Item = &'a Path>,
{
    let Some(target_time) = modified_time(target)? else {
        return Ok(Staleness::Missing);
    };
    for dep in dependencies {
        if let Some(dep_time) = modified_time(dep)? {
            if target_time < dep_time {
                return Ok(Staleness::OlderThan(dep.to_path_buf()));
            }
        }
    }
    Ok(Staleness::Fresh)
}

/// Returns `true` if `target` is missing, older than `primary`, or older than
/// any of `auxiliary`.
pub fn is_stale<'a, I>(
    target: &Path,
    primary: &'a Path,
    auxiliary: I,
) -> Result<bool, StaleError>
where
    I: IntoIterator<Item = &'a Path>,
{
    let deps = std::iter::once(primary).chain(auxiliary);
    Ok(evaluate(target, deps)?.is_stale())
}
