//! Turns descriptor lists into deduplicated sets of absolute paths.

use std::path::{Path, PathBuf};

use ember_common::{DescriptorList, ResolvedPathSet, SourceDescriptor};
use ember_config::ConfigError;

use crate::error::{PipelineError, ResolveError};
use crate::scanner::FileScanner;

/// Resolves [`DescriptorList`]s against a project root.
pub struct SourceResolver<'a> {
    scanner: &'a dyn FileScanner,
    project_root: PathBuf,
}

impl<'a> SourceResolver<'a> {
    /// Creates a resolver that joins relative descriptors onto `project_root`.
    pub fn new(scanner: &'a dyn FileScanner, project_root: &Path) -> Self {
        Self {
            scanner,
            project_root: project_root.to_path_buf(),
        }
    }

    /// Expands every descriptor and merges the results.
    ///
    /// Explicit files are taken as given; file sets are handed to the scanner.
    pub fn resolve(&self, descriptors: &DescriptorList) -> Result<ResolvedPathSet, ResolveError> {
        let mut resolved = ResolvedPathSet::new();
        for descriptor in descriptors {
            match descriptor.rooted_at(&self.project_root) {
                SourceDescriptor::File(path) => {
                    resolved.insert(path);
                }
                SourceDescriptor::FileSet {
                    dir,
                    include,
                    exclude,
                } => {
                    resolved.extend(self.scanner.scan(&dir, &include, &exclude)?);
                }
            }
        }
        Ok(resolved)
    }

    /// Like [`resolve`](Self::resolve), but an empty result is a configuration
    /// error.
    pub fn resolve_required(
        &self,
        descriptors: &DescriptorList,
    ) -> Result<ResolvedPathSet, PipelineError> {
        let resolved = self.resolve(descriptors)?;
        if resolved.is_empty() {
            return Err(ConfigError::EmptySourceSet.into());
        }
        Ok(resolved)
    }
}
