//! Unresolved source descriptors.

use std::path::{Path, PathBuf};

use crate::path_set::normalize;

/// A single description of where source files come from.
///
/// Descriptors are resolved into concrete paths by the pipeline's source
/// resolver. Until then they are kept apart from resolved paths so that the
/// two are never confused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    /// One explicit file.
    File(PathBuf),
    /// Every file under `dir` matching `include` and none of `exclude`.
    FileSet {
        /// Base directory the patterns are relative to.
        dir: PathBuf,
        /// Glob pattern selecting files (e.g. `**/*.wxs`).
        include: String,
        /// Glob patterns removing files from the include match.
        exclude: Vec<String>,
    },
}

impl SourceDescriptor {
    /// Creates a descriptor for one explicit file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Creates a directory + include pattern descriptor with no excludes.
    pub fn file_set(dir: impl Into<PathBuf>, include: impl Into<String>) -> Self {
        Self::FileSet {
            dir: dir.into(),
            include: include.into(),
            exclude: Vec::new(),
        }
    }

    /// Returns a copy of this descriptor with relative paths joined onto `root`
    /// and `.`/`..` components folded away.
    pub fn rooted_at(&self, root: &Path) -> Self {
        match self {
            Self::File(path) => Self::File(normalize(&root.join(path))),
            Self::FileSet {
                dir,
                include,
                exclude,
            } => Self::FileSet {
                dir: normalize(&root.join(dir)),
                include: include.clone(),
                exclude: exclude.clone(),
            },
        }
    }
}

/// An ordered list of descriptors that still have to be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorList(Vec<SourceDescriptor>);

impl DescriptorList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a descriptor.
    pub fn push(&mut self, descriptor: SourceDescriptor) {
        self.0.push(descriptor);
    }

    /// Returns `true` if no descriptor has been configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of descriptors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the descriptors in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, SourceDescriptor> {
        self.0.iter()
    }
}

impl FromIterator<SourceDescriptor> for DescriptorList {
    fn from_iter<I: IntoIterator<Item = SourceDescriptor>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a DescriptorList {
    type Item = &'a SourceDescriptor;
    type IntoIter = std::slice::Iter<'a, SourceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
