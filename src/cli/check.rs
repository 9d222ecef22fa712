//! Check command implementation
//!
//! This module implements the `gcsafe check` command, which:
//! - Loads configuration from gcsafe.toml (or `--config`)
//! - Discovers translation unit dumps
//! - Runs the pattern rules over every dump in parallel
//! - Formats diagnostics (human or JSONL)
//! - Returns an exit code derived from the emitted severities

use crate::cli::args::{ColorChoice, OutputFormat};
use crate::cli::common::{
    EXIT_ERROR, EXIT_PARSE_ERROR, EXIT_SUCCESS, EXIT_VIOLATIONS, config_exit_code, load_config,
};
use crate::engine::file_walker::FileWalkerError;
use crate::engine::{CheckResult, Checker, FileWalker};
use crate::error::{ConfigError, HostError};
use crate::output::{HumanFormatter, JsonlFormatter};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use termcolor::StandardStream;

/// Error type specific to check command
#[derive(Debug, thiserror::Error)]
pub(crate) enum CheckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("File walker error: {0}")]
    FileWalker(#[from] FileWalkerError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Options for one check run
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub paths: Vec<PathBuf>,
    pub format: OutputFormat,
    pub color: ColorChoice,
    pub config: Option<PathBuf>,
    pub warnings_as_errors: bool,
    pub enable_members_on_stack_check: bool,
    pub exclude: Vec<String>,
}

/// Run the check command
///
/// # Returns
///
/// Exit code:
/// - 0: No error-severity diagnostics (warnings allowed)
/// - 1: At least one error-severity diagnostic
/// - 2: Configuration, discovery or I/O error
/// - 3: Malformed configuration or translation unit dump
pub fn run_check(options: &CheckOptions) -> i32 {
    match run_check_inner(options) {
        Ok(result) => exit_code(&result),
        Err(e) => {
            eprintln!("Error: {}", e);
            match e {
                CheckError::Config(ref config_error) => config_exit_code(config_error),
                _ => EXIT_ERROR,
            }
        }
    }
}

fn run_check_inner(options: &CheckOptions) -> Result<CheckResult, CheckError> {
    let mut config = load_config(options.config.as_deref())?;
    // Flags only ever turn checks on
    config.checks.warnings_as_errors |= options.warnings_as_errors;
    config.checks.enable_members_on_stack_check |= options.enable_members_on_stack_check;

    let files = FileWalker::new(&options.paths, &options.exclude)?.collect()?;
    if files.is_empty() {
        tracing::warn!("no translation unit dumps found");
    }

    let checker = Checker::new(config);
    tracing::info!(
        units = files.len(),
        rules = checker.rule_count(),
        "checking translation units"
    );
    let result = checker.check_files(&files);

    match options.format {
        OutputFormat::Human => {
            let mut stdout = StandardStream::stdout(options.color.into());
            HumanFormatter::new().write(&mut stdout, &result)?;
        }
        OutputFormat::Jsonl => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(JsonlFormatter::new().format(&result).as_bytes())?;
        }
    }

    Ok(result)
}

/// Exit code for a finished run
///
/// Dumps that could not be loaded take precedence over diagnostics.
pub(crate) fn exit_code(result: &CheckResult) -> i32 {
    if result
        .failures
        .iter()
        .any(|e| matches!(e, HostError::Json { .. }))
    {
        EXIT_PARSE_ERROR
    } else if !result.failures.is_empty() {
        EXIT_ERROR
    } else if result.error_count() > 0 {
        EXIT_VIOLATIONS
    } else {
        EXIT_SUCCESS
    }
}

impl CheckOptions {
    /// Options with default flags for the given paths
    pub fn for_paths(paths: &[impl AsRef<Path>]) -> Self {
        Self {
            paths: paths.iter().map(|p| p.as_ref().to_path_buf()).collect(),
            format: OutputFormat::Human,
            color: ColorChoice::Never,
            config: None,
            warnings_as_errors: false,
            enable_members_on_stack_check: false,
            exclude: Vec::new(),
        }
    }
}
