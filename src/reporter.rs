#![forbid(unsafe_code)]

//! Turns matched nodes into diagnostics
//!
//! Every violation passes two independent gates before it reaches the engine:
//! the location of the offending node must classify as first-party, and no
//! suppression (opt-out annotation on the node, or an exempt enclosing record)
//! may apply. A draft that fails either gate is discarded and never counted.

use crate::classifier::LocationClassifier;
use crate::host::ast::{
    CallExpr, ConstructExpr, FieldDecl, FunctionId, NewExpr, RecordId, TranslationUnit, VarDecl,
};
use crate::host::diagnostics::{DiagnosticDraft, DiagnosticsEngine};
use crate::host::source::SourceRange;
use crate::rules::{member_on_stack, optional, unique_ptr, variant};
use crate::suppression::Suppressions;
use crate::types::RuleId;

/// Why a candidate was not reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Location is third-party, generated, or unresolvable
    OutOfScope,
    /// Opt-out annotation or an exempt enclosing record
    Suppressed,
}

/// One reporter per translation unit
pub struct DiagnosticsReporter<'a> {
    tu: &'a TranslationUnit,
    classifier: LocationClassifier<'a>,
    suppressions: &'a Suppressions,
    engine: DiagnosticsEngine,
    excluded: usize,
}

impl<'a> DiagnosticsReporter<'a> {
    pub fn new(
        tu: &'a TranslationUnit,
        classifier: LocationClassifier<'a>,
        suppressions: &'a Suppressions,
        engine: DiagnosticsEngine,
    ) -> Self {
        Self {
            tu,
            classifier,
            suppressions,
            engine,
            excluded: 0,
        }
    }

    pub fn engine(&self) -> &DiagnosticsEngine {
        &self.engine
    }

    pub fn into_engine(self) -> DiagnosticsEngine {
        self.engine
    }

    /// Candidates dropped by classification or suppression
    pub fn excluded_count(&self) -> usize {
        self.excluded
    }

    pub fn unique_ptr_used_with_gc(
        &mut self,
        call: &CallExpr,
        function: FunctionId,
        managed: RecordId,
        enclosing: Option<RecordId>,
    ) {
        let factory = self
            .tu
            .function(function)
            .map(|f| f.name.trim_start_matches("::").to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        let managed_name = self.tu.record_display_name(managed);
        let message = format!(
            "Disallowed use of '{factory}' found; '{managed_name}' is a garbage-collected type. \
             Sole-ownership pointers cannot hold garbage-collected objects."
        );
        let draft = self.draft(unique_ptr::RULE_ID, call.range.clone(), message, managed);
        self.finish(draft, &[], enclosing);
    }

    pub fn optional_field_used_with_gc(
        &mut self,
        field: &FieldDecl,
        wrapper: RecordId,
        managed: RecordId,
        enclosing: Option<RecordId>,
    ) {
        let message = format!(
            "Disallowed optional field '{}' of type '{}' found; '{}' is a garbage-collected type. \
             Optional fields cannot hold garbage-collected objects.",
            field.name,
            self.tu.record_display_name(wrapper),
            self.tu.record_display_name(managed),
        );
        let range = SourceRange::at(field.location.clone());
        let draft = self.draft(optional::RULE_ID, range, message, managed);
        self.finish(draft, &field.annotations, enclosing);
    }

    pub fn optional_new_expr_used_with_gc(
        &mut self,
        new_expr: &NewExpr,
        wrapper: RecordId,
        managed: RecordId,
        enclosing: Option<RecordId>,
    ) {
        let message = format!(
            "Disallowed construction of '{}' found; '{}' is a garbage-collected type. \
             Optional cannot hold garbage-collected objects.",
            self.tu.record_display_name(wrapper),
            self.tu.record_display_name(managed),
        );
        let draft = self.draft(optional::RULE_ID, new_expr.range.clone(), message, managed);
        self.finish(draft, &[], enclosing);
    }

    pub fn variant_used_with_gc(
        &mut self,
        construct: &ConstructExpr,
        variant: RecordId,
        managed: RecordId,
        enclosing: Option<RecordId>,
    ) {
        let message = format!(
            "Disallowed construction of '{}' found; '{}' is a garbage-collected type. \
             Variant cannot hold garbage-collected objects.",
            self.tu.record_display_name(variant),
            self.tu.record_display_name(managed),
        );
        let draft = self.draft(variant::RULE_ID, construct.range.clone(), message, managed);
        self.finish(draft, &[], enclosing);
    }

    pub fn member_on_stack(&mut self, var: &VarDecl, enclosing: Option<RecordId>) {
        let message = format!(
            "Member variable '{}' of type '{}' declared on the stack; \
             use a raw pointer or reference instead.",
            var.name,
            self.tu.type_display_name(&var.ty),
        );
        let range = SourceRange::at(var.location.clone());
        let draft = self
            .engine
            .draft(RuleId::from_static(member_on_stack::RULE_ID), range, message);
        self.finish(draft, &var.annotations, enclosing);
    }

    /// Draft with a note pointing at the managed type's declaration
    fn draft(
        &self,
        rule_id: &'static str,
        range: SourceRange,
        message: String,
        managed: RecordId,
    ) -> DiagnosticDraft {
        let draft = self
            .engine
            .draft(RuleId::from_static(rule_id), range, message);
        match self.tu.record(managed) {
            Some(decl) => draft.note(
                decl.location.clone(),
                format!("'{}' declared here", self.tu.record_display_name(managed)),
            ),
            None => draft,
        }
    }

    /// Run both gates, then commit or discard
    fn finish(
        &mut self,
        draft: DiagnosticDraft,
        annotations: &[String],
        enclosing: Option<RecordId>,
    ) {
        let location = &draft.diagnostic().range.begin;
        let location_type = self.classifier.classify(location);
        let exclusion = if !location_type.is_in_scope() {
            Some(Exclusion::OutOfScope)
        } else if self.is_suppressed(annotations, enclosing) {
            Some(Exclusion::Suppressed)
        } else {
            None
        };

        match exclusion {
            Some(reason) => {
                tracing::debug!(
                    rule = %draft.diagnostic().rule_id,
                    %location,
                    ?reason,
                    "candidate not reported"
                );
                self.excluded += 1;
                draft.discard();
            }
            None => draft.location_type(location_type).commit(&mut self.engine),
        }
    }

    fn is_suppressed(&self, annotations: &[String], enclosing: Option<RecordId>) -> bool {
        self.suppressions.is_ignore_annotated(annotations)
            || enclosing.is_some_and(|record| self.suppressions.is_record_suppressed(self.tu, record))
    }
}
