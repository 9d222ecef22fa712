#![forbid(unsafe_code)]

//! Core PatternRule trait and the nodes a match binds

use crate::host::ast::{
    CallExpr, ConstructExpr, FieldDecl, FunctionId, NewExpr, RecordId, VarDecl,
};
use crate::reporter::DiagnosticsReporter;
use crate::rules::finder::Registrar;
use crate::types::RuleId;

/// Nodes bound by a successful structural match
///
/// Exactly one of the primary nodes (`call`, `new_expr`, `construct`,
/// `field`, `var`) is set; the rest are auxiliary context for the message.
/// Borrowed from the translation unit and dropped right after dispatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundNodes<'t> {
    pub call: Option<&'t CallExpr>,
    pub new_expr: Option<&'t NewExpr>,
    pub construct: Option<&'t ConstructExpr>,
    pub field: Option<&'t FieldDecl>,
    pub var: Option<&'t VarDecl>,
    /// Callee of `call`
    pub function: Option<FunctionId>,
    /// The offending template specialization (optional, variant, ...)
    pub specialization: Option<RecordId>,
    /// The garbage-collected type that made the match unsafe
    pub managed: Option<RecordId>,
    /// Innermost record declaration surrounding the match, filled in by the finder
    pub enclosing_record: Option<RecordId>,
    /// Innermost function whose body contains the match, filled in by the finder
    pub enclosing_function: Option<FunctionId>,
}

/// Trait that all pattern rules implement
///
/// A rule declares the structural shapes it watches for in [`register`] and
/// receives every hit in [`on_match`], once per matching node. Rules are
/// independent of each other and hold no per-unit state.
///
/// [`register`]: PatternRule::register
/// [`on_match`]: PatternRule::on_match
pub trait PatternRule: Send + Sync {
    /// Returns the unique identifier for this rule
    fn id(&self) -> &RuleId;

    /// Returns a human-readable description of what this rule checks
    fn description(&self) -> &str;

    /// Declares the node shapes this rule matches
    fn register(&self, registrar: &mut Registrar<'_>);

    /// Handles one match, forwarding violations to the reporter
    fn on_match(&self, bound: &BoundNodes<'_>, reporter: &mut DiagnosticsReporter<'_>);
}
