#![forbid(unsafe_code)]

//! JSONL output formatter for machine-readable output
//!
//! Outputs one JSON object per line in a deterministic order:
//! 1. All diagnostic records (sorted by file, line, column, rule)
//! 2. One load_error record per dump that could not be read
//! 3. One status record

use crate::engine::CheckResult;
use crate::host::diagnostics::Diagnostic;
use serde::Serialize;

/// JSONL output formatter
pub struct JsonlFormatter;

impl JsonlFormatter {
    pub fn new() -> Self {
        JsonlFormatter
    }

    /// Format the check result as JSONL
    pub fn format(&self, result: &CheckResult) -> String {
        let mut output = String::new();

        let mut diagnostics: Vec<DiagnosticRecord<'_>> =
            result.diagnostics().map(DiagnosticRecord::from).collect();
        diagnostics.sort_by(|a, b| {
            a.file
                .cmp(b.file)
                .then_with(|| a.line.cmp(&b.line))
                .then_with(|| a.column.cmp(&b.column))
                .then_with(|| a.rule.cmp(b.rule))
        });
        for record in &diagnostics {
            push_line(&mut output, record);
        }

        for failure in &result.failures {
            push_line(
                &mut output,
                &LoadErrorRecord {
                    record_type: "load_error",
                    message: failure.to_string(),
                },
            );
        }

        let status = StatusRecord {
            record_type: "status",
            passed: result.error_count() == 0 && result.failures.is_empty(),
            units_checked: result.units.len() as u64,
            rules_executed: result.rules_executed as u64,
            errors: result.error_count() as u64,
            warnings: result.warning_count() as u64,
            excluded: result.units.iter().map(|u| u.excluded as u64).sum(),
        };
        push_line(&mut output, &status);

        output
    }
}

impl Default for JsonlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn push_line<T: Serialize>(output: &mut String, record: &T) {
    if let Ok(json) = serde_json::to_string(record) {
        output.push_str(&json);
        output.push('\n');
    }
}

#[derive(Debug, Serialize)]
struct NoteRecord<'a> {
    file: &'a str,
    line: u32,
    column: u32,
    message: &'a str,
}

/// Diagnostic record for JSONL output
#[derive(Debug, Serialize)]
struct DiagnosticRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    rule: &'a str,
    severity: &'static str,
    file: &'a str,
    line: u32,
    column: u32,
    message: &'a str,
    location_type: &'static str,
    notes: Vec<NoteRecord<'a>>,
}

impl<'a> From<&'a Diagnostic> for DiagnosticRecord<'a> {
    fn from(diagnostic: &'a Diagnostic) -> Self {
        let begin = &diagnostic.range.begin;
        Self {
            record_type: "diagnostic",
            rule: diagnostic.rule_id.as_str(),
            severity: diagnostic.severity.as_str(),
            file: begin.filename(),
            line: begin.line,
            column: begin.column,
            message: &diagnostic.message,
            location_type: diagnostic.location_type.as_str(),
            notes: diagnostic
                .notes
                .iter()
                .map(|note| NoteRecord {
                    file: note.location.filename(),
                    line: note.location.line,
                    column: note.location.column,
                    message: &note.message,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct LoadErrorRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    message: String,
}

/// Status record for JSONL output
#[derive(Debug, Serialize)]
struct StatusRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    passed: bool,
    units_checked: u64,
    rules_executed: u64,
    errors: u64,
    warnings: u64,
    excluded: u64,
}
