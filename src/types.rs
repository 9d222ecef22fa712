#![forbid(unsafe_code)]

//! Core domain types for gcsafe
//!
//! This module defines the small value types shared by the classifier, the
//! pattern rules and the diagnostics layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity levels
///
/// `Note` never touches the error/warning counters; it only annotates a
/// committed diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    /// Severity for rule violations under the global escalation policy
    pub fn for_violation(warnings_as_errors: bool) -> Self {
        if warnings_as_errors {
            Severity::Error
        } else {
            Severity::Warning
        }
    }

    /// Returns the lowercase label used in clang-style output
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a source location lives, as far as the checks are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationType {
    /// First-party code outside the relaxed subsystem
    FirstPartyDefault,
    /// First-party code inside the relaxed subsystem root
    FirstPartyRelaxed,
    /// Vendored, generated, system or otherwise out-of-scope code
    ThirdParty,
}

impl LocationType {
    /// Returns true if diagnostics may be emitted for this location
    pub fn is_in_scope(&self) -> bool {
        !matches!(self, LocationType::ThirdParty)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::FirstPartyDefault => "first-party-default",
            LocationType::FirstPartyRelaxed => "first-party-relaxed",
            LocationType::ThirdParty => "third-party",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated rule identifier
///
/// Rule IDs must be non-empty and contain only alphanumeric characters, hyphens, and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleId(String);

impl RuleId {
    /// Creates a new RuleId, validating the input
    ///
    /// Returns None if the input is empty or contains invalid characters
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() {
            return None;
        }
        if !id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return None;
        }
        Some(RuleId(id))
    }

    /// Builds a RuleId from a compile-time constant known to be valid
    pub(crate) fn from_static(id: &'static str) -> Self {
        debug_assert!(RuleId::new(id).is_some(), "invalid builtin rule id {id}");
        RuleId(id.to_string())
    }

    /// Returns the rule ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RuleId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RuleId::new(value).ok_or_else(|| "Invalid rule ID".to_string())
    }
}

impl From<RuleId> for String {
    fn from(rule_id: RuleId) -> Self {
        rule_id.0
    }
}

/// A source path in canonical search form
///
/// Backslashes become forward slashes and a leading slash is always present,
/// so directory markers of the form `/foo/` match relative paths too. The
/// normalized path need not exist on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NormalizedPath(String);

impl NormalizedPath {
    /// Creates a new NormalizedPath with normalization
    pub fn new(path: impl Into<String>) -> Self {
        NormalizedPath(Self::normalize(path.into()))
    }

    fn normalize(path: String) -> String {
        let mut path = path.replace('\\', "/");
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        path
    }

    /// Returns true if `needle` occurs anywhere in the path
    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for NormalizedPath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ok(NormalizedPath::new(value))
    }
}

impl From<NormalizedPath> for String {
    fn from(path: NormalizedPath) -> Self {
        path.0
    }
}
