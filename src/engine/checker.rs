#![forbid(unsafe_code)]

//! Runs the pattern checks over translation unit dumps
//!
//! Each unit gets its own reporter and diagnostics engine; the only shared
//! state is the immutable [`Config`] and suppression tables, so dumps are
//! checked in parallel using rayon.

use crate::classifier::LocationClassifier;
use crate::config::Config;
use crate::error::HostError;
use crate::host::ast::TranslationUnit;
use crate::host::diagnostics::{Diagnostic, DiagnosticsEngine};
use crate::reporter::DiagnosticsReporter;
use crate::rules::RuleRegistry;
use crate::suppression::Suppressions;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Outcome of checking one translation unit
#[derive(Debug, Clone)]
pub struct UnitReport {
    /// Dump the unit was loaded from, if any
    pub path: Option<PathBuf>,
    pub main_file: String,
    pub diagnostics: Vec<Diagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
    /// Candidates dropped by classification or suppression
    pub excluded: usize,
}

/// Result of checking a batch of dumps
#[derive(Debug, Default)]
pub struct CheckResult {
    pub units: Vec<UnitReport>,
    /// Dumps that could not be loaded
    pub failures: Vec<HostError>,
    pub rules_executed: usize,
}

impl CheckResult {
    pub fn error_count(&self) -> usize {
        self.units.iter().map(|u| u.error_count).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.units.iter().map(|u| u.warning_count).sum()
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.units.iter().flat_map(|u| u.diagnostics.iter())
    }
}

/// Checker bound to one configuration
pub struct Checker {
    config: Config,
    suppressions: Suppressions,
    registry: RuleRegistry,
}

impl Checker {
    pub fn new(config: Config) -> Self {
        let suppressions = Suppressions::new(&config.suppression);
        let registry = RuleRegistry::builtin(&config.checks);
        Self {
            config,
            suppressions,
            registry,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of rules that will run for each unit
    pub fn rule_count(&self) -> usize {
        self.registry.len()
    }

    /// Check a single, already loaded unit
    pub fn check_unit(&self, tu: &TranslationUnit) -> UnitReport {
        let mut reporter = DiagnosticsReporter::new(
            tu,
            LocationClassifier::new(&self.config.locations),
            &self.suppressions,
            DiagnosticsEngine::new(self.config.checks.warnings_as_errors),
        );
        self.registry.run(tu, &self.config.names, &mut reporter);

        let excluded = reporter.excluded_count();
        let engine = reporter.into_engine();
        tracing::debug!(
            unit = %tu.main_file,
            errors = engine.error_count(),
            warnings = engine.warning_count(),
            excluded,
            "checked translation unit"
        );
        UnitReport {
            path: None,
            main_file: tu.main_file.clone(),
            error_count: engine.error_count(),
            warning_count: engine.warning_count(),
            excluded,
            diagnostics: engine.into_diagnostics(),
        }
    }

    /// Load and check one dump
    pub fn check_file(&self, path: &Path) -> Result<UnitReport, HostError> {
        let tu = TranslationUnit::load(path)?;
        let mut report = self.check_unit(&tu);
        report.path = Some(path.to_path_buf());
        Ok(report)
    }

    /// Check every dump in parallel; reports come back in input order
    pub fn check_files(&self, paths: &[PathBuf]) -> CheckResult {
        let results: Vec<Result<UnitReport, HostError>> =
            paths.par_iter().map(|path| self.check_file(path)).collect();

        let mut outcome = CheckResult {
            rules_executed: self.registry.len(),
            ..Default::default()
        };
        for result in results {
            match result {
                Ok(report) => outcome.units.push(report),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to load translation unit");
                    outcome.failures.push(e);
                }
            }
        }
        outcome
    }
}
