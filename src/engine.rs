//! Dump discovery and parallel checking

pub mod checker;
pub mod file_walker;

pub use checker::{CheckResult, Checker, UnitReport};
pub use file_walker::{DUMP_SUFFIX, FileWalker, FileWalkerError};
