#![forbid(unsafe_code)]

//! Single-pass structural matching over a translation unit
//!
//! Rules register plain matcher functions per node kind. [`MatchFinder::match_ast`]
//! walks the tree once, depth-first in declaration order, and hands every hit
//! to the caller together with the index of the rule that registered it.
//! Each hit carries the innermost record and function surrounding it.

use crate::host::ast::{FunctionId, Node, RecordId};
use crate::predicates::TypePredicates;
use crate::rules::rule::BoundNodes;

/// Node kinds a matcher can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Call,
    New,
    Construct,
    Field,
    Var,
}

impl NodeKind {
    /// Kind of a node, or None for purely structural nodes
    pub fn of(node: &Node) -> Option<Self> {
        match node {
            Node::Call(_) => Some(NodeKind::Call),
            Node::New(_) => Some(NodeKind::New),
            Node::Construct(_) => Some(NodeKind::Construct),
            Node::Field(_) => Some(NodeKind::Field),
            Node::Var(_) => Some(NodeKind::Var),
            Node::Namespace { .. }
            | Node::Record { .. }
            | Node::Function { .. }
            | Node::Stmt { .. } => None,
        }
    }
}

/// A structural test: returns the bound nodes when `node` has the watched shape
pub type NodeMatcher = for<'t> fn(&TypePredicates<'t>, &'t Node) -> Option<BoundNodes<'t>>;

#[derive(Debug, Clone, Copy)]
struct Registration {
    kind: NodeKind,
    rule: usize,
    matcher: NodeMatcher,
}

/// Declarations surrounding the node being visited
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    record: Option<RecordId>,
    function: Option<FunctionId>,
}

/// Holds every registered matcher for one traversal
#[derive(Debug, Default)]
pub struct MatchFinder {
    registrations: Vec<Registration>,
}

/// Registration handle scoped to a single rule
pub struct Registrar<'f> {
    finder: &'f mut MatchFinder,
    rule: usize,
}

impl Registrar<'_> {
    /// Watch nodes of `kind` with `matcher`
    pub fn add_matcher(&mut self, kind: NodeKind, matcher: NodeMatcher) {
        self.finder.registrations.push(Registration {
            kind,
            rule: self.rule,
            matcher,
        });
    }
}

impl MatchFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registration handle whose matchers report back as `rule`
    pub fn registrar(&mut self, rule: usize) -> Registrar<'_> {
        Registrar { finder: self, rule }
    }

    /// Number of registered matchers
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Walk the whole unit once, calling `on_match(rule, bound)` per hit
    pub fn match_ast<'t, F>(&self, predicates: &TypePredicates<'t>, mut on_match: F)
    where
        F: FnMut(usize, &BoundNodes<'t>),
    {
        if self.registrations.is_empty() {
            return;
        }
        for node in &predicates.unit().decls {
            self.visit(predicates, node, Scope::default(), &mut on_match);
        }
    }

    fn visit<'t, F>(
        &self,
        predicates: &TypePredicates<'t>,
        node: &'t Node,
        scope: Scope,
        on_match: &mut F,
    ) where
        F: FnMut(usize, &BoundNodes<'t>),
    {
        if let Some(kind) = NodeKind::of(node) {
            for registration in self.registrations.iter().filter(|r| r.kind == kind) {
                if let Some(mut bound) = (registration.matcher)(predicates, node) {
                    bound.enclosing_record = scope.record;
                    bound.enclosing_function = scope.function;
                    on_match(registration.rule, &bound);
                }
            }
        }

        let inner = match node {
            Node::Record { record, .. } => Scope {
                record: Some(*record),
                ..scope
            },
            Node::Function { function, .. } => Scope {
                function: Some(*function),
                ..scope
            },
            _ => scope,
        };
        for child in node.children() {
            self.visit(predicates, child, inner, on_match);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamesConfig;
    use crate::host::ast::{FieldDecl, TranslationUnit, Type, VarDecl, VarStorage};
    use crate::host::source::SourceLocation;

    fn any_field<'t>(_: &TypePredicates<'t>, node: &'t Node) -> Option<BoundNodes<'t>> {
        match node {
            Node::Field(field) => Some(BoundNodes {
                field: Some(field),
                ..Default::default()
            }),
            _ => None,
        }
    }

    fn any_var<'t>(_: &TypePredicates<'t>, node: &'t Node) -> Option<BoundNodes<'t>> {
        match node {
            Node::Var(var) => Some(BoundNodes {
                var: Some(var),
                ..Default::default()
            }),
            _ => None,
        }
    }

    fn field(name: &str) -> Node {
        Node::Field(FieldDecl {
            name: name.to_string(),
            ty: Type::builtin("int"),
            location: SourceLocation::default(),
            annotations: vec![],
        })
    }

    fn var(name: &str) -> Node {
        Node::Var(VarDecl {
            name: name.to_string(),
            ty: Type::builtin("int"),
            location: SourceLocation::default(),
            storage: VarStorage::Automatic,
            annotations: vec![],
            init: None,
        })
    }

    fn unit() -> TranslationUnit {
        TranslationUnit {
            decls: vec![
                Node::Namespace {
                    name: "blink".to_string(),
                    children: vec![Node::Record {
                        record: RecordId(0),
                        children: vec![field("a"), field("b")],
                    }],
                },
                Node::Stmt {
                    children: vec![var("x"), field("c")],
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_visits_in_order_with_rule_index() {
        let tu = unit();
        let names = NamesConfig::default();
        let predicates = TypePredicates::new(&tu, &names);

        let mut finder = MatchFinder::new();
        finder.registrar(0).add_matcher(NodeKind::Field, any_field);
        finder.registrar(1).add_matcher(NodeKind::Var, any_var);
        assert_eq!(finder.len(), 2);

        let mut hits = Vec::new();
        finder.match_ast(&predicates, |rule, bound| {
            let name = bound
                .field
                .map(|f| f.name.clone())
                .or_else(|| bound.var.map(|v| v.name.clone()))
                .unwrap();
            hits.push((rule, name, bound.enclosing_record));
        });

        assert_eq!(
            hits,
            vec![
                (0, "a".to_string(), Some(RecordId(0))),
                (0, "b".to_string(), Some(RecordId(0))),
                (1, "x".to_string(), None),
                (0, "c".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_tracks_enclosing_function() {
        let tu = TranslationUnit {
            decls: vec![Node::Record {
                record: RecordId(2),
                children: vec![
                    Node::Function {
                        function: FunctionId(4),
                        body: vec![Node::Stmt {
                            children: vec![var("local")],
                        }],
                    },
                    var("member_static"),
                ],
            }],
            ..Default::default()
        };
        let names = NamesConfig::default();
        let predicates = TypePredicates::new(&tu, &names);

        let mut finder = MatchFinder::new();
        finder.registrar(0).add_matcher(NodeKind::Var, any_var);

        let mut hits = Vec::new();
        finder.match_ast(&predicates, |_, bound| {
            hits.push((
                bound.var.map(|v| v.name.as_str()),
                bound.enclosing_record,
                bound.enclosing_function,
            ));
        });

        assert_eq!(
            hits,
            vec![
                (Some("local"), Some(RecordId(2)), Some(FunctionId(4))),
                (Some("member_static"), Some(RecordId(2)), None),
            ]
        );
    }

    #[test]
    fn test_no_registrations_no_callbacks() {
        let tu = unit();
        let names = NamesConfig::default();
        let predicates = TypePredicates::new(&tu, &names);

        let finder = MatchFinder::new();
        assert!(finder.is_empty());
        let mut count = 0;
        finder.match_ast(&predicates, |_, _| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_two_matchers_same_kind_both_fire() {
        let tu = unit();
        let names = NamesConfig::default();
        let predicates = TypePredicates::new(&tu, &names);

        let mut finder = MatchFinder::new();
        finder.registrar(0).add_matcher(NodeKind::Field, any_field);
        finder.registrar(3).add_matcher(NodeKind::Field, any_field);

        let mut per_rule = [0usize; 4];
        finder.match_ast(&predicates, |rule, _| per_rule[rule] += 1);
        assert_eq!(per_rule, [3, 0, 0, 3]);
    }
}
