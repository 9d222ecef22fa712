#![forbid(unsafe_code)]

//! Mechanical rewrite support
//!
//! Applies edit directives produced by refactoring tools to files on disk.
//! Files the [`LocationClassifier`] puts in third-party or generated code are
//! left alone, and optional path filters narrow the set further.

pub mod apply;
pub mod edits;
pub mod include;

pub use apply::{FileOutcome, apply_to_contents, extend_list_deletion};
pub use edits::{BEGIN_EDITS, END_EDITS, Edit, EditKind, EditSet, extract_edits, parse_edit_line};
pub use include::{insert_user_include, primary_header_basename};

use crate::classifier::LocationClassifier;
use crate::engine::file_walker::{FileWalkerError, build_globset};
use crate::error::EditError;
use crate::types::LocationType;
use globset::GlobSet;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Restricts which files are edited
///
/// A filter is either a glob or a plain path prefix. Prefixes are resolved
/// against `base` (the invocation directory) and match whole path components,
/// so `base` selects `<base>/base/...` but not `<base>/third_party/x/base/...`.
/// With no filters every file passes.
#[derive(Debug, Clone)]
pub struct PathFilter {
    prefixes: Vec<PathBuf>,
    globs: Option<GlobSet>,
}

fn is_glob(filter: &str) -> bool {
    filter.contains(['*', '?', '[', '{'])
}

impl PathFilter {
    pub fn new(filters: &[String], base: &Path) -> Result<Self, FileWalkerError> {
        let mut prefixes = Vec::new();
        let mut patterns = Vec::new();
        for filter in filters {
            let filter = filter.trim_end_matches('/');
            if is_glob(filter) {
                let anchored = if filter.starts_with('/') || filter.starts_with("**") {
                    filter.to_string()
                } else {
                    format!("**/{filter}")
                };
                patterns.push(format!("{anchored}/**"));
                patterns.push(anchored);
            } else {
                let prefix = base.join(filter);
                // Edit targets are canonical, so compare against the canonical prefix
                prefixes.push(prefix.canonicalize().unwrap_or(prefix));
            }
        }
        let globs = if patterns.is_empty() {
            None
        } else {
            Some(build_globset(&patterns)?)
        };
        Ok(Self { prefixes, globs })
    }

    pub fn allows(&self, path: &Path) -> bool {
        if self.prefixes.is_empty() && self.globs.is_none() {
            return true;
        }
        self.prefixes.iter().any(|prefix| path.starts_with(prefix))
            || self.globs.as_ref().is_some_and(|set| set.is_match(path))
    }
}

/// Totals over one apply-edits run
#[derive(Debug, Default)]
pub struct ApplySummary {
    pub files_changed: usize,
    pub edits_applied: usize,
    pub errors: Vec<EditError>,
    /// Files skipped by classification or filters
    pub files_skipped: usize,
    pub extended_deletions: usize,
}

impl ApplySummary {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Apply every edit in `set` to disk
pub fn apply_edit_set(
    set: EditSet,
    filter: &PathFilter,
    classifier: LocationClassifier<'_>,
) -> ApplySummary {
    let (selected, skipped): (Vec<_>, Vec<_>) = set
        .by_file
        .into_iter()
        .partition(|(path, _)| is_editable(path, filter, classifier));

    for (path, _) in &skipped {
        tracing::debug!(path = %path.display(), "skipping file");
    }

    let results: Vec<(PathBuf, Result<FileOutcome, EditError>)> = selected
        .into_par_iter()
        .map(|(path, edits)| {
            let result = apply_to_file(&path, edits);
            (path, result)
        })
        .collect();

    let mut summary = ApplySummary {
        files_skipped: skipped.len(),
        ..Default::default()
    };
    for (path, result) in results {
        match result {
            Ok(outcome) => {
                if outcome.applied > 0 {
                    summary.files_changed += 1;
                }
                summary.edits_applied += outcome.applied;
                summary.extended_deletions += outcome.extended_deletions;
                summary.errors.extend(outcome.errors);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to edit file");
                summary.errors.push(e);
            }
        }
    }
    tracing::info!(
        edits = summary.edits_applied,
        errors = summary.errors.len(),
        files = summary.files_changed,
        "applied edits"
    );
    summary
}

fn is_editable(path: &Path, filter: &PathFilter, classifier: LocationClassifier<'_>) -> bool {
    filter.allows(path)
        && classifier.classify_path(&path.to_string_lossy()) != LocationType::ThirdParty
}

fn apply_to_file(path: &Path, edits: Vec<Edit>) -> Result<FileOutcome, EditError> {
    let contents = fs::read(path)?;
    let mut outcome = apply_to_contents(path, contents, edits);
    fs::write(path, &outcome.contents)?;
    // Contents are on disk; keep only the counters
    outcome.contents = Vec::new();
    Ok(outcome)
}
