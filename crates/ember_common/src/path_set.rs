//! Deduplicated sets of resolved file paths.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

/// Removes `.` components and folds `..` into the preceding component without
/// touching the filesystem.
///
/// A `..` directly under the root is dropped; a leading `..` of a relative
/// path is kept. Symbolic links are not followed, so `link/..` folds even if
/// `link` points elsewhere.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// A deduplicated set of resolved file paths.
///
/// Identity is the normalized path: `src/../src/a.wxs` and `src/a.wxs` are the
/// same member. Iteration order is the sorted path order,
/// which keeps tool command lines stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedPathSet(BTreeSet<PathBuf>);

impl ResolvedPathSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a path. Returns `false` if it was already present.
    pub fn insert(&mut self, path: impl Into<PathBuf>) -> bool {
        self.0.insert(normalize(&path.into()))
    }

    /// Returns `true` if the set contains `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.0.contains(&normalize(path))
    }

    /// Returns the number of paths.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set holds no paths.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the paths in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }

    /// Returns a new set holding every path of `self` and `other`.
    pub fn union(&self, other: &ResolvedPathSet) -> ResolvedPathSet {
        Self(self.0.union(&other.0).cloned().collect())
    }
}

impl FromIterator<PathBuf> for ResolvedPathSet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self(iter.into_iter().map(|p| normalize(&p)).collect())
    }
}

impl Extend<PathBuf> for ResolvedPathSet {
    fn extend<I: IntoIterator<Item = PathBuf>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(|p| normalize(&p)));
    }
}

impl IntoIterator for ResolvedPathSet {
    type Item = PathBuf;
    type IntoIter = std::collections::btree_set::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
