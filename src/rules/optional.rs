#![forbid(unsafe_code)]

//! Optional-value wrappers around garbage-collected types
//!
//! Two shapes share one predicate: a field whose declared type is the unsafe
//! optional, and a `new` expression constructing one. The bound node tells
//! them apart.

use crate::host::ast::Node;
use crate::predicates::TypePredicates;
use crate::reporter::DiagnosticsReporter;
use crate::rules::finder::{NodeKind, Registrar};
use crate::rules::rule::{BoundNodes, PatternRule};
use crate::types::RuleId;

pub const RULE_ID: &str = "optional-gc";

pub struct OptionalGarbageCollected {
    id: RuleId,
}

impl OptionalGarbageCollected {
    pub fn new() -> Self {
        Self {
            id: RuleId::from_static(RULE_ID),
        }
    }
}

impl Default for OptionalGarbageCollected {
    fn default() -> Self {
        Self::new()
    }
}

fn match_optional_field<'t>(p: &TypePredicates<'t>, node: &'t Node) -> Option<BoundNodes<'t>> {
    let Node::Field(field) = node else {
        return None;
    };
    let found = p.is_unsafe_optional_of(&field.ty)?;
    Some(BoundNodes {
        field: Some(field),
        specialization: Some(found.specialization),
        managed: Some(found.managed),
        ..Default::default()
    })
}

/// `new` whose direct initializer constructs the unsafe optional
fn match_optional_new<'t>(p: &TypePredicates<'t>, node: &'t Node) -> Option<BoundNodes<'t>> {
    let Node::New(new_expr) = node else {
        return None;
    };
    let Some(Node::Construct(construct)) = new_expr.init.as_deref() else {
        return None;
    };
    let found = p.is_unsafe_ownership_container(construct.record, &p.names().optional_templates)?;
    Some(BoundNodes {
        new_expr: Some(new_expr),
        specialization: Some(found.specialization),
        managed: Some(found.managed),
        ..Default::default()
    })
}

impl PatternRule for OptionalGarbageCollected {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn description(&self) -> &str {
        "Optional wrappers must not hold garbage-collected objects"
    }

    fn register(&self, registrar: &mut Registrar<'_>) {
        registrar.add_matcher(NodeKind::Field, match_optional_field);
        registrar.add_matcher(NodeKind::New, match_optional_new);
    }

    fn on_match(&self, bound: &BoundNodes<'_>, reporter: &mut DiagnosticsReporter<'_>) {
        let (Some(optional), Some(managed)) = (bound.specialization, bound.managed) else {
            return;
        };
        if let Some(field) = bound.field {
            reporter.optional_field_used_with_gc(field, optional, managed, bound.enclosing_record);
        } else if let Some(new_expr) = bound.new_expr {
            reporter.optional_new_expr_used_with_gc(
                new_expr,
                optional,
                managed,
                bound.enclosing_record,
            );
        }
    }
}
