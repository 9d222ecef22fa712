//! Error types for gcsafe
//!
//! This module defines the error types used throughout gcsafe, following
//! a hierarchical structure with specific error variants for different
//! error categories. Rule violations are not errors: they are diagnostics.

use std::path::PathBuf;

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid TOML syntax or shape
    #[error("Invalid configuration syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// Semantically invalid configuration
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Errors loading a translation unit dump supplied by the host compiler
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("I/O error reading {file}: {source}")]
    Io {
        file: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed translation unit dump {file}: {source}")]
    Json {
        file: PathBuf,
        source: serde_json::Error,
    },
}

/// Errors applying mechanical edits
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// An edit directive line could not be parsed
    #[error("Unable to parse edit: {0}")]
    Parse(String),

    /// Two edits replace the same range with different text
    #[error(
        "Conflicting replacement text: {file} at offset {offset}, length {length}: \"{first}\" != \"{second}\""
    )]
    Conflict {
        file: PathBuf,
        offset: usize,
        length: usize,
        first: String,
        second: String,
    },

    /// Two edits touch overlapping ranges
    #[error("Overlapping replacements: {file} at offset {offset}, length {length} and offset {other_offset}, length {other_length}")]
    Overlap {
        file: PathBuf,
        offset: usize,
        length: usize,
        other_offset: usize,
        other_length: usize,
    },

    /// An edit points past the end of the file
    #[error("Edit out of bounds: {file} at offset {offset}, length {length} (file is {size} bytes)")]
    OutOfBounds {
        file: PathBuf,
        offset: usize,
        length: usize,
        size: usize,
    },

    /// Unknown edit directive
    #[error("Unrecognized edit directive \"{directive}\": {file}")]
    UnknownDirective { directive: String, file: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error type for gcsafe
#[derive(Debug, thiserror::Error)]
pub enum GcsafeError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Host dump error
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// Edit application error
    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
