//! Intermediate target name derivation.
//!
//! Every primary source maps to exactly one intermediate object: the source's
//! file name with its extension replaced by the toolchain's object extension,
//! placed in the intermediate directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ember_common::ResolvedPathSet;

use crate::error::StaleError;

/// Derives the intermediate target for `source` under `base_dir`.
///
/// The extension is everything after the last `.` of the file name, unless
/// that `.` is the first character (`.hidden` has no extension and becomes
/// `.hidden.<ext>`). File names are carried over byte for byte, so names that
/// are not valid UTF-8 survive. Returns `None` if `source` has no file name.
pub fn derive_target(source: &Path, base_dir: &Path, object_extension: &str) -> Option<PathBuf> {
    let mut name = source.file_stem()?.to_os_string();
    name.push(".");
    name.push(object_extension);
    Some(base_dir.join(name))
}

/// Maps primary sources to intermediate targets for one pipeline run.
#[derive(Debug, Clone)]
pub struct TargetDeriver {
    base_dir: PathBuf,
    object_extension: String,
}

impl TargetDeriver {
    /// Creates a deriver rooted at `intermediate_dir`, or at `cwd` when no
    /// intermediate directory is configured.
    pub fn new(intermediate_dir: Option<&Path>, cwd: &Path, object_extension: &str) -> Self {
        Self {
            base_dir: intermediate_dir.unwrap_or(cwd).to_path_buf(),
            object_extension: object_extension.to_string(),
        }
    }

    /// The directory targets are placed in.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Derives the target of a single source.
    pub fn derive(&self, source: &Path) -> Result<PathBuf, StaleError> {
        derive_target(source, &self.base_dir, &self.object_extension)
            .ok_or_else(|| StaleError::NoFileName(source.to_path_buf()))
    }

    /// Derives targets for every source, in the set's order.
    ///
    /// Fails with [`StaleError::TargetCollision`] if two sources would write
    /// the same target, since the second compile would silently overwrite the
    /// first one's output.
    pub fn derive_all(
        &self,
        sources: &ResolvedPathSet,
    ) -> Result<Vec<(PathBuf, PathBuf)>, StaleError> {
        let mut seen: HashMap<PathBuf, &Path> = HashMap::with_capacity(sources.len());
        let mut pairs = Vec::with_capacity(sources.len());
        for source in sources.iter() {
            let target = self.derive(source)?;
            if let Some(first) = seen.insert(target.clone(), source) {
                return Err(StaleError::TargetCollision {
                    target,
                    first: first.to_path_buf(),
                    second: source.to_path_buf(),
                });
            }
            pairs.push((source.to_path_buf(), target));
        }
        Ok(pairs)
    }
}
