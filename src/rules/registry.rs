#![forbid(unsafe_code)]

//! Rule registry and the single-pass orchestrator
//!
//! The RuleRegistry is responsible for:
//! - Building the built-in rule set for a given `[checks]` configuration
//! - Registering every rule's matchers with one [`MatchFinder`]
//! - Dispatching each match to the owning rule

use crate::config::{ChecksConfig, NamesConfig};
use crate::host::ast::TranslationUnit;
use crate::predicates::TypePredicates;
use crate::reporter::DiagnosticsReporter;
use crate::rules::finder::MatchFinder;
use crate::rules::rule::PatternRule;
use crate::rules::{
    MemberOnStack, OptionalGarbageCollected, UniquePtrGarbageCollected, VariantGarbageCollected,
};
use crate::types::RuleId;

/// Ordered collection of pattern rules
///
/// Rules are stored as trait objects so new shapes can be added without
/// touching the traversal.
pub struct RuleRegistry {
    rules: Vec<Box<dyn PatternRule>>,
}

impl RuleRegistry {
    /// Create a new empty RuleRegistry
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The built-in rules enabled by `checks`
    ///
    /// The stack-reference rule is only registered when
    /// `enable_members_on_stack_check` is set.
    pub fn builtin(checks: &ChecksConfig) -> Self {
        let mut registry = Self::new();
        registry.add(Box::new(UniquePtrGarbageCollected::new()));
        registry.add(Box::new(OptionalGarbageCollected::new()));
        registry.add(Box::new(VariantGarbageCollected::new()));
        if checks.enable_members_on_stack_check {
            registry.add(Box::new(MemberOnStack::new()));
        }
        tracing::debug!(rules = registry.len(), "built rule set");
        registry
    }

    /// Add a rule; later rules with a duplicate id are ignored
    pub fn add(&mut self, rule: Box<dyn PatternRule>) {
        if self.get_rule(rule.id()).is_some() {
            tracing::warn!(rule = %rule.id(), "duplicate rule id, ignoring");
            return;
        }
        self.rules.push(rule);
    }

    /// Get a rule by its ID
    pub fn get_rule(&self, id: &RuleId) -> Option<&dyn PatternRule> {
        self.rules.iter().find(|r| r.id() == id).map(|r| r.as_ref())
    }

    pub fn iter_rules(&self) -> impl Iterator<Item = &dyn PatternRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Register all rules and walk `tu` once, dispatching matches to `reporter`
    pub fn run(&self, tu: &TranslationUnit, names: &NamesConfig, reporter: &mut DiagnosticsReporter<'_>) {
        let mut finder = MatchFinder::new();
        for (index, rule) in self.rules.iter().enumerate() {
            rule.register(&mut finder.registrar(index));
        }

        let predicates = TypePredicates::new(tu, names);
        finder.match_ast(&predicates, |index, bound| {
            if let Some(rule) = self.rules.get(index) {
                tracing::trace!(
                    rule = %rule.id(),
                    function = bound
                        .enclosing_function
                        .and_then(|id| tu.function(id))
                        .map_or("<none>", |f| f.name.as_str()),
                    "match"
                );
                rule.on_match(bound, reporter);
            }
        });
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Run every enabled pattern check over one translation unit
pub fn find_bad_patterns(
    tu: &TranslationUnit,
    reporter: &mut DiagnosticsReporter<'_>,
    checks: &ChecksConfig,
    names: &NamesConfig,
) {
    RuleRegistry::builtin(checks).run(tu, names, reporter);
}
