#![forbid(unsafe_code)]

//! Sole-ownership factories instantiated with a garbage-collected type

use crate::host::ast::Node;
use crate::predicates::TypePredicates;
use crate::reporter::DiagnosticsReporter;
use crate::rules::finder::{NodeKind, Registrar};
use crate::rules::rule::{BoundNodes, PatternRule};
use crate::types::RuleId;

pub const RULE_ID: &str = "unique-ptr-gc";

/// Flags `std::make_unique<T>()` and friends when `T` is garbage-collected
pub struct UniquePtrGarbageCollected {
    id: RuleId,
}

impl UniquePtrGarbageCollected {
    pub fn new() -> Self {
        Self {
            id: RuleId::from_static(RULE_ID),
        }
    }
}

impl Default for UniquePtrGarbageCollected {
    fn default() -> Self {
        Self::new()
    }
}

/// Any call whose callee is a listed factory with a managed template argument
fn match_factory_call<'t>(p: &TypePredicates<'t>, node: &'t Node) -> Option<BoundNodes<'t>> {
    let Node::Call(call) = node else {
        return None;
    };
    let function = p.unit().function(call.callee)?;
    let managed = p.is_unsafe_ownership_factory(function, &p.names().unique_factories)?;
    Some(BoundNodes {
        call: Some(call),
        function: Some(call.callee),
        managed: Some(managed),
        ..Default::default()
    })
}

impl PatternRule for UniquePtrGarbageCollected {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn description(&self) -> &str {
        "Garbage-collected types must not be owned by sole-ownership pointers"
    }

    fn register(&self, registrar: &mut Registrar<'_>) {
        registrar.add_matcher(NodeKind::Call, match_factory_call);
    }

    fn on_match(&self, bound: &BoundNodes<'_>, reporter: &mut DiagnosticsReporter<'_>) {
        let (Some(call), Some(function), Some(managed)) = (bound.call, bound.function, bound.managed)
        else {
            return;
        };
        reporter.unique_ptr_used_with_gc(call, function, managed, bound.enclosing_record);
    }
}
