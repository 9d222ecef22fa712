#![forbid(unsafe_code)]

//! Suppression metadata
//!
//! Explicit opt-out annotations plus the fixed lists of historically exempted
//! record names and base classes. Built once from [`SuppressionConfig`] and
//! read-only afterwards.

use crate::config::SuppressionConfig;
use crate::host::ast::{RecordId, TranslationUnit, qualified_name_is};
use std::collections::HashSet;

/// Read-only suppression tables
#[derive(Debug, Clone)]
pub struct Suppressions {
    ignore_annotation: String,
    ignored_record_names: HashSet<String>,
    ignored_base_classes: Vec<String>,
}

impl Suppressions {
    pub fn new(config: &SuppressionConfig) -> Self {
        Self {
            ignore_annotation: config.ignore_annotation.clone(),
            ignored_record_names: config.ignored_record_names.iter().cloned().collect(),
            ignored_base_classes: config.ignored_base_classes.clone(),
        }
    }

    /// Annotation string marking a declaration as exempt
    pub fn ignore_annotation(&self) -> &str {
        &self.ignore_annotation
    }

    /// Returns true if the annotation list carries the opt-out marker
    pub fn is_ignore_annotated(&self, annotations: &[String]) -> bool {
        annotations.iter().any(|a| a == &self.ignore_annotation)
    }

    /// Returns true if the record's simple name is on the ignore list
    pub fn is_ignored_type(&self, simple_name: &str) -> bool {
        self.ignored_record_names.contains(simple_name)
    }

    /// Returns true if any base of `record`, transitively, is an ignored base class
    pub fn has_ignored_bases(&self, tu: &TranslationUnit, record: RecordId) -> bool {
        let mut visited = HashSet::new();
        self.has_ignored_bases_inner(tu, record, &mut visited)
    }

    fn has_ignored_bases_inner(
        &self,
        tu: &TranslationUnit,
        record: RecordId,
        visited: &mut HashSet<RecordId>,
    ) -> bool {
        if !visited.insert(record) {
            return false;
        }
        let Some(decl) = tu.record(record) else {
            return false;
        };
        for &base in &decl.bases {
            let Some(base_decl) = tu.record(base) else {
                continue;
            };
            if self
                .ignored_base_classes
                .iter()
                .any(|ignored| qualified_name_is(&base_decl.name, ignored))
            {
                return true;
            }
            if self.has_ignored_bases_inner(tu, base, visited) {
                return true;
            }
        }
        false
    }

    /// Returns true if nothing inside `record` should be reported
    pub fn is_record_suppressed(&self, tu: &TranslationUnit, record: RecordId) -> bool {
        let Some(decl) = tu.record(record) else {
            return false;
        };
        self.is_ignore_annotated(&decl.annotations)
            || self.is_ignored_type(decl.simple_name())
            || self.has_ignored_bases(tu, record)
    }
}
