//! Apply-edits command implementation
//!
//! Reads edit directives from stdin, either bare or wrapped in the
//! `==== BEGIN EDITS ====` / `==== END EDITS ====` markers refactoring tools
//! print, and applies them to the files they name.

use crate::cli::common::{EXIT_ERROR, EXIT_SUCCESS, EXIT_VIOLATIONS, config_exit_code, load_config};
use crate::classifier::LocationClassifier;
use crate::rewrite::{ApplySummary, BEGIN_EDITS, EditSet, PathFilter, apply_edit_set, extract_edits};
use std::io::{self, Read};
use std::path::Path;

/// Run the apply-edits command on stdin
pub fn run_apply_edits(build_dir: &Path, filters: &[String], config: Option<&Path>) -> i32 {
    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        eprintln!("Error: failed to read edits from stdin: {}", e);
        return EXIT_ERROR;
    }
    apply_edits_from(&input, build_dir, filters, config)
}

/// Apply the directives in `input`
///
/// Returns 1 when any directive failed to parse or apply.
pub fn apply_edits_from(
    input: &str,
    build_dir: &Path,
    filters: &[String],
    config: Option<&Path>,
) -> i32 {
    let config = match load_config(config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return config_exit_code(&e);
        }
    };
    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("Error: failed to read current directory: {}", e);
            return EXIT_ERROR;
        }
    };
    let filter = match PathFilter::new(filters, &cwd) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_ERROR;
        }
    };

    let lines = directive_lines(input);
    let set = EditSet::parse(lines, build_dir);
    let parse_errors = set.parse_errors;
    let missing_files = set.missing_files;

    let summary = apply_edit_set(set, &filter, LocationClassifier::new(&config.locations));
    for error in &summary.errors {
        eprintln!("Error: {}", error);
    }
    eprintln!("{}", summary_line(&summary, parse_errors + missing_files));

    if parse_errors > 0 || summary.error_count() > 0 {
        EXIT_VIOLATIONS
    } else {
        EXIT_SUCCESS
    }
}

fn directive_lines(input: &str) -> Vec<&str> {
    if input.lines().any(|line| line.trim_end_matches('\r') == BEGIN_EDITS) {
        extract_edits(input)
    } else {
        input
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect()
    }
}

fn summary_line(summary: &ApplySummary, rejected: usize) -> String {
    format!(
        "Applied {} edits ({} errors, {} rejected directives) to {} files; {} files skipped.",
        summary.edits_applied,
        summary.error_count(),
        rejected,
        summary.files_changed,
        summary.files_skipped,
    )
}
