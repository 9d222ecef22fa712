//! Diagnostics engine standing in for the host compiler's
//!
//! Emission is two-phase: a [`DiagnosticDraft`] is built first and then either
//! committed into the engine or discarded. Only a commit touches the
//! error/warning counters the calling tool uses for its exit status.

use crate::host::source::{SourceLocation, SourceRange};
use crate::types::{LocationType, RuleId, Severity};
use serde::Serialize;
use std::collections::HashSet;

/// A secondary message attached to a diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub location: SourceLocation,
    pub message: String,
}

/// A committed diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub rule_id: RuleId,
    pub severity: Severity,
    pub range: SourceRange,
    pub message: String,
    pub location_type: LocationType,
    pub notes: Vec<Note>,
}

/// A diagnostic that has been formatted but not yet emitted
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a draft diagnostic must be committed or discarded"]
pub struct DiagnosticDraft {
    diagnostic: Diagnostic,
}

impl DiagnosticDraft {
    /// Attach a note, e.g. pointing at the declaration of the offending type
    pub fn note(mut self, location: SourceLocation, message: impl Into<String>) -> Self {
        self.diagnostic.notes.push(Note {
            location,
            message: message.into(),
        });
        self
    }

    pub fn location_type(mut self, location_type: LocationType) -> Self {
        self.diagnostic.location_type = location_type;
        self
    }

    /// Peek at the pending diagnostic
    pub fn diagnostic(&self) -> &Diagnostic {
        &self.diagnostic
    }

    /// Emit the diagnostic into the engine
    pub fn commit(self, engine: &mut DiagnosticsEngine) {
        engine.emit(self.diagnostic);
    }

    /// Drop the diagnostic without emitting it
    pub fn discard(self) {}
}

/// Collects diagnostics for one translation unit and keeps the counters
#[derive(Debug, Default)]
pub struct DiagnosticsEngine {
    warnings_as_errors: bool,
    diagnostics: Vec<Diagnostic>,
    seen: HashSet<(SourceLocation, String)>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticsEngine {
    pub fn new(warnings_as_errors: bool) -> Self {
        Self {
            warnings_as_errors,
            ..Default::default()
        }
    }

    /// Severity for rule violations under the current policy
    pub fn violation_level(&self) -> Severity {
        Severity::for_violation(self.warnings_as_errors)
    }

    /// Start a violation diagnostic at the current severity level
    pub fn draft(
        &self,
        rule_id: RuleId,
        range: SourceRange,
        message: impl Into<String>,
    ) -> DiagnosticDraft {
        DiagnosticDraft {
            diagnostic: Diagnostic {
                rule_id,
                severity: self.violation_level(),
                range,
                message: message.into(),
                location_type: LocationType::FirstPartyDefault,
                notes: Vec::new(),
            },
        }
    }

    fn emit(&mut self, diagnostic: Diagnostic) {
        // Identical diagnostics at the same spot (e.g. revisited template
        // instantiations) are reported once.
        let key = (diagnostic.range.begin.clone(), diagnostic.message.clone());
        if !self.seen.insert(key) {
            tracing::trace!(location = %diagnostic.range.begin, "dropping duplicate diagnostic");
            return;
        }

        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Note => {}
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> RuleId {
        RuleId::new("test-rule").unwrap()
    }

    fn range(line: u32) -> SourceRange {
        SourceRange::at(SourceLocation::new("a.cc", line, 1))
    }

    #[test]
    fn test_commit_counts_warning() {
        let mut engine = DiagnosticsEngine::new(false);
        engine.draft(rule(), range(1), "bad").commit(&mut engine);

        assert_eq!(engine.warning_count(), 1);
        assert_eq!(engine.error_count(), 0);
        assert_eq!(engine.diagnostics()[0].severity, Severity::Warning);
    }

    #[test]
    fn test_warnings_as_errors_escalates() {
        let mut engine = DiagnosticsEngine::new(true);
        engine.draft(rule(), range(1), "bad").commit(&mut engine);

        assert!(engine.has_errors());
        assert_eq!(engine.warning_count(), 0);
        assert_eq!(engine.diagnostics()[0].severity, Severity::Error);
    }

    #[test]
    fn test_discard_emits_nothing() {
        let mut engine = DiagnosticsEngine::new(false);
        let draft = engine.draft(rule(), range(1), "bad");
        draft.discard();

        assert!(engine.diagnostics().is_empty());
        assert_eq!(engine.warning_count(), 0);
    }

    #[test]
    fn test_exact_duplicates_collapse() {
        let mut engine = DiagnosticsEngine::new(false);
        engine.draft(rule(), range(4), "bad").commit(&mut engine);
        engine.draft(rule(), range(4), "bad").commit(&mut engine);
        // Same message at a different site is a distinct violation
        engine.draft(rule(), range(5), "bad").commit(&mut engine);

        assert_eq!(engine.diagnostics().len(), 2);
        assert_eq!(engine.warning_count(), 2);
    }

    #[test]
    fn test_notes_do_not_count() {
        let mut engine = DiagnosticsEngine::new(false);
        engine
            .draft(rule(), range(1), "bad")
            .note(SourceLocation::new("node.h", 3, 7), "declared here")
            .commit(&mut engine);

        let diagnostic = &engine.diagnostics()[0];
        assert_eq!(diagnostic.notes.len(), 1);
        assert_eq!(engine.warning_count(), 1);
    }
}
