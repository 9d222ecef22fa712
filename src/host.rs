//! The host-compiler boundary: semantic tree, source positions and the
//! diagnostics engine the checks report into

pub mod ast;
pub mod diagnostics;
pub mod source;

pub use ast::{
    CallExpr, ConstructExpr, FieldDecl, FunctionDecl, FunctionId, NewExpr, Node, RecordDecl,
    RecordId, TemplateArgument, TranslationUnit, Type, VarDecl, VarStorage,
};
pub use diagnostics::{Diagnostic, DiagnosticDraft, DiagnosticsEngine, Note};
pub use source::{SourceLocation, SourceRange};
