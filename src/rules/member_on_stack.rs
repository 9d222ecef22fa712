#![forbid(unsafe_code)]

//! Managed-reference wrappers declared as stack variables
//!
//! Only registered when the members-on-stack check is enabled. The opt-out
//! annotation is honoured by the reporter.

use crate::host::ast::Node;
use crate::predicates::TypePredicates;
use crate::reporter::DiagnosticsReporter;
use crate::rules::finder::{NodeKind, Registrar};
use crate::rules::rule::{BoundNodes, PatternRule};
use crate::types::RuleId;

pub const RULE_ID: &str = "member-on-stack";

pub struct MemberOnStack {
    id: RuleId,
}

impl MemberOnStack {
    pub fn new() -> Self {
        Self {
            id: RuleId::from_static(RULE_ID),
        }
    }
}

impl Default for MemberOnStack {
    fn default() -> Self {
        Self::new()
    }
}

fn match_member_var<'t>(p: &TypePredicates<'t>, node: &'t Node) -> Option<BoundNodes<'t>> {
    let Node::Var(var) = node else {
        return None;
    };
    if !var.storage.is_stack() || !p.is_member_wrapper(&var.ty) {
        return None;
    }
    Some(BoundNodes {
        var: Some(var),
        ..Default::default()
    })
}

impl PatternRule for MemberOnStack {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn description(&self) -> &str {
        "Managed-reference wrappers must not live on the stack"
    }

    fn register(&self, registrar: &mut Registrar<'_>) {
        registrar.add_matcher(NodeKind::Var, match_member_var);
    }

    fn on_match(&self, bound: &BoundNodes<'_>, reporter: &mut DiagnosticsReporter<'_>) {
        if let Some(var) = bound.var {
            reporter.member_on_stack(var, bound.enclosing_record);
        }
    }
}
