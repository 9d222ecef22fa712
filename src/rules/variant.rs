#![forbid(unsafe_code)]

//! Tagged unions with a garbage-collected alternative

use crate::host::ast::Node;
use crate::predicates::TypePredicates;
use crate::reporter::DiagnosticsReporter;
use crate::rules::finder::{NodeKind, Registrar};
use crate::rules::rule::{BoundNodes, PatternRule};
use crate::types::RuleId;

pub const RULE_ID: &str = "variant-gc";

pub struct VariantGarbageCollected {
    id: RuleId,
}

impl VariantGarbageCollected {
    pub fn new() -> Self {
        Self {
            id: RuleId::from_static(RULE_ID),
        }
    }
}

impl Default for VariantGarbageCollected {
    fn default() -> Self {
        Self::new()
    }
}

/// Construction of a variant whose argument pack holds a managed type
fn match_variant_construction<'t>(
    p: &TypePredicates<'t>,
    node: &'t Node,
) -> Option<BoundNodes<'t>> {
    let Node::Construct(construct) = node else {
        return None;
    };
    let found = p.is_unsafe_variant_of(construct.record)?;
    Some(BoundNodes {
        construct: Some(construct),
        specialization: Some(found.specialization),
        managed: Some(found.managed),
        ..Default::default()
    })
}

impl PatternRule for VariantGarbageCollected {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn description(&self) -> &str {
        "Variants must not hold garbage-collected objects"
    }

    fn register(&self, registrar: &mut Registrar<'_>) {
        registrar.add_matcher(NodeKind::Construct, match_variant_construction);
    }

    fn on_match(&self, bound: &BoundNodes<'_>, reporter: &mut DiagnosticsReporter<'_>) {
        let (Some(construct), Some(variant), Some(managed)) =
            (bound.construct, bound.specialization, bound.managed)
        else {
            return;
        };
        reporter.variant_used_with_gc(construct, variant, managed, bound.enclosing_record);
    }
}
