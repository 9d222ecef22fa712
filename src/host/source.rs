//! Source positions as reported by the host compiler

use serde::{Deserialize, Serialize};
use std::fmt;

/// Filename the host uses for its token-pasting buffer
pub const SCRATCH_SPACE: &str = "<scratch space>";

/// A position in the translation unit
///
/// `file` is the spelling filename (where the characters were written). A
/// location with an `expanded_from` parent is a macro location; the parent is
/// its immediate expansion site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
    /// Set when the spelling file is a system header
    #[serde(default)]
    pub system: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded_from: Option<Box<SourceLocation>>,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: Some(file.into()),
            line,
            column,
            system: false,
            expanded_from: None,
        }
    }

    /// A location whose file cannot be determined
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Marks the location as lying in a system header
    pub fn in_system_header(mut self) -> Self {
        self.system = true;
        self
    }

    /// Wraps this location as the spelling of a macro expanded at `site`
    pub fn expanded_at(mut self, site: SourceLocation) -> Self {
        self.expanded_from = Some(Box::new(site));
        self
    }

    pub fn is_macro(&self) -> bool {
        self.expanded_from.is_some()
    }

    /// Spelling filename, or "" when unknown
    pub fn filename(&self) -> &str {
        self.file.as_deref().unwrap_or("")
    }

    /// The immediate expansion site of a macro location
    pub fn immediate_expansion(&self) -> Option<&SourceLocation> {
        self.expanded_from.as_deref()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file, self.line, self.column),
            None => f.write_str("<unknown>"),
        }
    }
}

/// A half-open source range anchored on the offending node
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceRange {
    pub begin: SourceLocation,
    #[serde(default)]
    pub end: Option<SourceLocation>,
}

impl SourceRange {
    pub fn at(begin: SourceLocation) -> Self {
        Self { begin, end: None }
    }

    pub fn new(begin: SourceLocation, end: SourceLocation) -> Self {
        Self {
            begin,
            end: Some(end),
        }
    }

    /// End of the range, collapsing to the start for point ranges
    pub fn end(&self) -> &SourceLocation {
        self.end.as_ref().unwrap_or(&self.begin)
    }
}

impl From<SourceLocation> for SourceRange {
    fn from(loc: SourceLocation) -> Self {
        SourceRange::at(loc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expansion_chain() {
        let site = SourceLocation::new("a.cc", 10, 3);
        let mid = SourceLocation::new("macros.h", 4, 1).expanded_at(site.clone());
        let spelling = SourceLocation::new(SCRATCH_SPACE, 1, 1).expanded_at(mid.clone());

        assert!(spelling.is_macro());
        assert_eq!(spelling.immediate_expansion(), Some(&mid));
        assert_eq!(mid.immediate_expansion(), Some(&site));
        assert!(!site.is_macro());
    }

    #[test]
    fn test_unknown_location() {
        let loc = SourceLocation::unknown();
        assert_eq!(loc.filename(), "");
        assert_eq!(loc.to_string(), "<unknown>");
    }

    #[test]
    fn test_range_end_defaults_to_begin() {
        let range = SourceRange::at(SourceLocation::new("a.cc", 1, 2));
        assert_eq!(range.end().column, 2);
    }
}
