//! Discovery of translation unit dumps
//!
//! Directories handed to `check` are walked with the ignore crate (so
//! `.gitignore` is honoured) and only files ending in [`DUMP_SUFFIX`] are
//! returned. Explicit file arguments are taken as-is.

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Suffix the host compiler uses for translation unit dumps
pub const DUMP_SUFFIX: &str = ".ast.json";

/// Errors that can occur during file walking
#[derive(Debug, Error)]
pub enum FileWalkerError {
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        source: globset::Error,
    },

    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    #[error("Path does not exist: {0}")]
    Missing(PathBuf),
}

/// Reason why a file was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Path matched an exclude pattern
    ExcludedByPattern,
    /// File name does not end in the dump suffix
    NotADump,
    /// Not a regular file (e.g., directory, symlink)
    NotAFile,
}

/// Result of file walking: either a dump to check or a skipped path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkResult {
    Dump(PathBuf),
    Skipped { path: PathBuf, reason: SkipReason },
}

/// Returns true if `path` names a translation unit dump
pub fn is_dump(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(DUMP_SUFFIX) && name.len() > DUMP_SUFFIX.len())
}

/// Walks one or more roots for dumps
pub struct FileWalker {
    roots: Vec<PathBuf>,
    exclude_set: GlobSet,
}

impl FileWalker {
    /// Creates a new FileWalker
    ///
    /// `exclude` patterns are matched against each discovered path.
    /// `.git` directories are always excluded.
    pub fn new(roots: &[PathBuf], exclude: &[String]) -> Result<Self, FileWalkerError> {
        let mut patterns = exclude.to_vec();
        patterns.push("**/.git/**".to_string());
        Ok(Self {
            roots: roots.to_vec(),
            exclude_set: build_globset(&patterns)?,
        })
    }

    /// All dumps under the roots, sorted for deterministic output
    pub fn collect(self) -> Result<Vec<PathBuf>, FileWalkerError> {
        let mut dumps = Vec::new();
        for result in self.walk_with_skip_info() {
            match result? {
                WalkResult::Dump(path) => dumps.push(path),
                WalkResult::Skipped { path, reason } => {
                    tracing::trace!(path = %path.display(), ?reason, "skipped");
                }
            }
        }
        dumps.sort();
        dumps.dedup();
        Ok(dumps)
    }

    /// Walks every root and reports skipped paths too
    pub fn walk_with_skip_info(self) -> impl Iterator<Item = Result<WalkResult, FileWalkerError>> {
        let exclude_set = self.exclude_set;
        self.roots.into_iter().flat_map(move |root| {
            let exclude_set = exclude_set.clone();
            let results: Vec<Result<WalkResult, FileWalkerError>> = if !root.exists() {
                vec![Err(FileWalkerError::Missing(root))]
            } else if root.is_file() {
                // Explicit files are checked even without the dump suffix
                vec![Ok(classify_entry(&root, true, &exclude_set, true))]
            } else {
                WalkBuilder::new(&root)
                    .hidden(false)
                    .git_ignore(true)
                    .build()
                    .map(|entry| {
                        let entry = entry?;
                        let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
                        Ok(classify_entry(entry.path(), is_file, &exclude_set, false))
                    })
                    .collect()
            };
            results
        })
    }
}

fn classify_entry(path: &Path, is_file: bool, exclude_set: &GlobSet, explicit: bool) -> WalkResult {
    let skipped = |reason| WalkResult::Skipped {
        path: path.to_path_buf(),
        reason,
    };
    if !is_file {
        return skipped(SkipReason::NotAFile);
    }
    if exclude_set.is_match(path) {
        return skipped(SkipReason::ExcludedByPattern);
    }
    if !explicit && !is_dump(path) {
        return skipped(SkipReason::NotADump);
    }
    WalkResult::Dump(path.to_path_buf())
}

/// Builds a GlobSet from patterns
pub fn build_globset(patterns: &[String]) -> Result<GlobSet, FileWalkerError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| FileWalkerError::InvalidGlob {
            pattern: pattern.clone(),
            source: e,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| FileWalkerError::InvalidGlob {
        pattern: "<globset>".to_string(),
        source: e,
    })
}
