#![forbid(unsafe_code)]

//! gcsafe: garbage-collection safety checks for analyzed C++ code
//!
//! gcsafe inspects translation unit dumps produced by a C++ front end and
//! reports constructs that let a garbage-collected object escape the
//! collector's view: sole-ownership pointers, optionals and variants holding
//! managed types, and managed-reference wrappers living on the stack. It also
//! applies the mechanical edits refactoring tools emit.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod output;
pub mod predicates;
pub mod reporter;
pub mod rewrite;
pub mod rules;
pub mod suppression;
pub mod types;

// Re-export error types for convenient access
pub use error::{ConfigError, EditError, GcsafeError, HostError};

// Re-export core domain types for convenient access
pub use classifier::LocationClassifier;
pub use config::Config;
pub use engine::{CheckResult, Checker};
pub use host::ast::TranslationUnit;
pub use types::{LocationType, RuleId, Severity};
