#![forbid(unsafe_code)]

//! Compiler-style human output
//!
//! ```text
//! /src/content/a.cc:12:5: warning: Disallowed use of ... [unique-ptr-gc]
//! /src/blink/node.h:3:7: note: 'blink::Node' declared here
//! 1 warning generated.
//! ```

use crate::engine::CheckResult;
use crate::host::diagnostics::Diagnostic;
use crate::types::Severity;
use std::io::{self, Write};
use termcolor::{Color, ColorSpec, WriteColor};

/// Human-readable formatter
pub struct HumanFormatter;

impl HumanFormatter {
    pub fn new() -> Self {
        HumanFormatter
    }

    /// Write every diagnostic followed by the totals line
    pub fn write(&self, out: &mut dyn WriteColor, result: &CheckResult) -> io::Result<()> {
        for diagnostic in result.diagnostics() {
            self.write_diagnostic(out, diagnostic)?;
        }
        for failure in &result.failures {
            write_label(out, "error", Color::Red)?;
            writeln!(out, " {}", failure)?;
        }
        if let Some(totals) = totals_line(result.error_count(), result.warning_count()) {
            writeln!(out, "{totals}")?;
        }
        Ok(())
    }

    pub fn write_diagnostic(&self, out: &mut dyn WriteColor, diagnostic: &Diagnostic) -> io::Result<()> {
        out.set_color(ColorSpec::new().set_bold(true))?;
        write!(out, "{}:", diagnostic.range.begin)?;
        out.reset()?;
        write!(out, " ")?;
        let color = match diagnostic.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Magenta,
            Severity::Note => Color::Cyan,
        };
        write_label(out, diagnostic.severity.as_str(), color)?;
        out.set_color(ColorSpec::new().set_bold(true))?;
        write!(out, " {}", diagnostic.message)?;
        out.reset()?;
        writeln!(out, " [{}]", diagnostic.rule_id)?;

        for note in &diagnostic.notes {
            write!(out, "{}: ", note.location)?;
            write_label(out, Severity::Note.as_str(), Color::Cyan)?;
            writeln!(out, " {}", note.message)?;
        }
        Ok(())
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn write_label(out: &mut dyn WriteColor, label: &str, color: Color) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{label}:")?;
    out.reset()
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// "1 warning generated.", "2 errors and 1 warning generated.", or None
pub fn totals_line(errors: usize, warnings: usize) -> Option<String> {
    match (errors, warnings) {
        (0, 0) => None,
        (0, w) => Some(format!("{} generated.", plural(w, "warning"))),
        (e, 0) => Some(format!("{} generated.", plural(e, "error"))),
        (e, w) => Some(format!(
            "{} and {} generated.",
            plural(e, "error"),
            plural(w, "warning")
        )),
    }
}
