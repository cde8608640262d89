//! Expansion of directory + glob pattern file sets.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::ResolveError;

/// Expands one file set into the files it selects.
pub trait FileScanner {
    /// Returns every file below `base_dir` whose path relative to `base_dir`
    /// matches `include` and none of `exclude`.
    fn scan(
        &self,
        base_dir: &Path,
        include: &str,
        exclude: &[String],
    ) -> Result<Vec<PathBuf>, ResolveError>;
}

/// Walks the directory tree and matches relative paths with glob patterns.
///
/// `*` and `?` never cross a path separator; `**` matches any number of
/// directories, including none.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobScanner;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

fn compile_pattern(pattern: &str) -> Result<Pattern, ResolveError> {
    Pattern::new(pattern).map_err(|source| ResolveError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

impl FileScanner for GlobScanner {
    fn scan(
        &self,
        base_dir: &Path,
        include: &str,
        exclude: &[String],
    ) -> Result<Vec<PathBuf>, ResolveError> {
        if !base_dir.is_dir() {
            return Err(ResolveError::MissingDir(base_dir.to_path_buf()));
        }
        let include = compile_pattern(include)?;
        let exclude = exclude
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut files = Vec::new();
        for entry in WalkDir::new(base_dir).follow_links(true) {
            let entry = entry.map_err(|source| ResolveError::Walk {
                path: base_dir.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(base_dir) else {
                continue;
            };
            if include.matches_path_with(relative, MATCH_OPTIONS)
                && !exclude
                    .iter()
                    .any(|p| p.matches_path_with(relative, MATCH_OPTIONS))
            {
                files.push(entry.into_path());
            }
        }
        debug!(dir = %base_dir.display(), count = files.len(), "scanned file set");
        Ok(files)
    }
}
