//! Semantic tree of one translation unit, as handed over by the host compiler
//!
//! The host has already parsed and type-checked the unit; this module only
//! models the slice of its tree the pattern rules look at. Records and
//! functions live in side tables and are referenced by index so base-class
//! chains and callee lookups stay cheap. A dangling index is treated as an
//! absent node by every consumer.

use crate::error::HostError;
use crate::host::source::{SourceLocation, SourceRange};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

/// Index into [`TranslationUnit::records`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u32);

/// Index into [`TranslationUnit::functions`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionId(pub u32);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record#{}", self.0)
    }
}

/// Compares a qualified declaration name against a pattern such as
/// `::std::make_unique`. Leading `::` on either side is ignored.
pub fn qualified_name_is(name: &str, pattern: &str) -> bool {
    name.trim_start_matches("::") == pattern.trim_start_matches("::")
}

/// A class, struct or class-template specialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDecl {
    /// Qualified name; for a specialization this is the template's name
    pub name: String,
    /// Non-empty for class-template specializations
    #[serde(default)]
    pub template_args: Vec<TemplateArgument>,
    /// Direct bases, as canonical record declarations
    #[serde(default)]
    pub bases: Vec<RecordId>,
    #[serde(default)]
    pub location: SourceLocation,
    /// Annotation attribute strings attached to the declaration
    #[serde(default)]
    pub annotations: Vec<String>,
}

impl RecordDecl {
    /// Unqualified name, e.g. `Node` for `blink::Node`
    pub fn simple_name(&self) -> &str {
        self.name.rsplit("::").next().unwrap_or(&self.name)
    }

    pub fn is_specialization(&self) -> bool {
        !self.template_args.is_empty()
    }

    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.annotations.iter().any(|a| a == annotation)
    }
}

/// A function or function-template specialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    /// Explicit or deduced template arguments of a specialization
    #[serde(default)]
    pub template_args: Vec<TemplateArgument>,
    #[serde(default)]
    pub location: SourceLocation,
}

/// A type as written, possibly carrying alias sugar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Type {
    Record {
        record: RecordId,
    },
    Array {
        element: Box<Type>,
    },
    Pointer {
        pointee: Box<Type>,
    },
    Reference {
        referee: Box<Type>,
    },
    /// Typedef or alias-template sugar over another type
    Alias {
        name: String,
        /// Qualified name of the alias template, when the alias is one
        #[serde(default)]
        template: Option<String>,
        aliased: Box<Type>,
    },
    Builtin {
        name: String,
    },
    /// A type that still depends on uninstantiated template parameters
    Dependent,
}

impl Type {
    pub fn record(id: RecordId) -> Self {
        Type::Record { record: id }
    }

    pub fn array_of(element: Type) -> Self {
        Type::Array {
            element: Box::new(element),
        }
    }

    pub fn pointer_to(pointee: Type) -> Self {
        Type::Pointer {
            pointee: Box::new(pointee),
        }
    }

    pub fn builtin(name: impl Into<String>) -> Self {
        Type::Builtin { name: name.into() }
    }

    /// The type with all alias sugar stripped
    pub fn canonical(&self) -> &Type {
        let mut ty = self;
        while let Type::Alias { aliased, .. } = ty {
            ty = aliased;
        }
        ty
    }

    /// The record declaration behind the canonical type, if any
    pub fn as_record(&self) -> Option<RecordId> {
        match self.canonical() {
            Type::Record { record } => Some(*record),
            _ => None,
        }
    }

    /// Alias templates this type is spelled through, outermost first
    pub fn alias_templates(&self) -> impl Iterator<Item = &str> {
        let mut next = Some(self);
        std::iter::from_fn(move || {
            while let Some(ty) = next {
                match ty {
                    Type::Alias {
                        template, aliased, ..
                    } => {
                        next = Some(aliased);
                        if let Some(name) = template {
                            return Some(name.as_str());
                        }
                    }
                    _ => next = None,
                }
            }
            None
        })
    }
}

/// A template argument of a specialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateArgument {
    Type {
        #[serde(rename = "type")]
        ty: Type,
    },
    /// A variadic parameter pack; may be empty
    Pack {
        #[serde(default)]
        elements: Vec<TemplateArgument>,
    },
    Integral {
        value: i64,
    },
    Other,
}

impl TemplateArgument {
    pub fn of_type(ty: Type) -> Self {
        TemplateArgument::Type { ty }
    }

    pub fn pack(elements: Vec<TemplateArgument>) -> Self {
        TemplateArgument::Pack { elements }
    }

    /// The type this argument refers to, if it is a type argument
    pub fn as_type(&self) -> Option<&Type> {
        match self {
            TemplateArgument::Type { ty } => Some(ty),
            _ => None,
        }
    }
}

/// Storage of a variable declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarStorage {
    /// Block-scope automatic variable
    #[default]
    Automatic,
    /// Function parameter
    Parameter,
    /// Block-scope or class static
    Static,
    /// Namespace-scope variable
    Global,
}

impl VarStorage {
    /// True for variables that live in a stack frame
    pub fn is_stack(&self) -> bool {
        matches!(self, VarStorage::Automatic | VarStorage::Parameter)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub location: SourceLocation,
    #[serde(default)]
    pub annotations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub location: SourceLocation,
    #[serde(default)]
    pub storage: VarStorage,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub init: Option<Box<Node>>,
}

impl VarDecl {
    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.annotations.iter().any(|a| a == annotation)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub callee: FunctionId,
    #[serde(default)]
    pub range: SourceRange,
    #[serde(default)]
    pub args: Vec<Node>,
}

/// A heap-allocation (`new`) expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpr {
    pub allocated: Type,
    #[serde(default)]
    pub range: SourceRange,
    /// Direct initializer, usually a construct expression
    #[serde(default)]
    pub init: Option<Box<Node>>,
}

/// A constructor invocation; `record` is the constructor's class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructExpr {
    pub record: RecordId,
    #[serde(default)]
    pub range: SourceRange,
    #[serde(default)]
    pub args: Vec<Node>,
}

/// A node of the declaration/expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Namespace {
        name: String,
        #[serde(default)]
        children: Vec<Node>,
    },
    Record {
        record: RecordId,
        #[serde(default)]
        children: Vec<Node>,
    },
    Field(FieldDecl),
    Function {
        function: FunctionId,
        #[serde(default)]
        body: Vec<Node>,
    },
    Var(VarDecl),
    Call(CallExpr),
    New(NewExpr),
    Construct(ConstructExpr),
    /// Any other statement or expression that only groups children
    Stmt {
        #[serde(default)]
        children: Vec<Node>,
    },
}

impl Node {
    /// Direct children in source order
    pub fn children(&self) -> Box<dyn Iterator<Item = &Node> + '_> {
        match self {
            Node::Namespace { children, .. }
            | Node::Record { children, .. }
            | Node::Stmt { children } => Box::new(children.iter()),
            Node::Function { body, .. } => Box::new(body.iter()),
            Node::Field(_) => Box::new(std::iter::empty()),
            Node::Var(var) => Box::new(var.init.as_deref().into_iter()),
            Node::Call(call) => Box::new(call.args.iter()),
            Node::New(new) => Box::new(new.init.as_deref().into_iter()),
            Node::Construct(construct) => Box::new(construct.args.iter()),
        }
    }
}

/// One analyzed translation unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    #[serde(default)]
    pub main_file: String,
    #[serde(default)]
    pub records: Vec<RecordDecl>,
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
    #[serde(default)]
    pub decls: Vec<Node>,
}

impl TranslationUnit {
    /// Load a translation unit dump from a JSON file
    pub fn load(path: &Path) -> Result<Self, HostError> {
        let content = fs::read_to_string(path).map_err(|source| HostError::Io {
            file: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content, path)
    }

    /// Parse a translation unit dump; `origin` is only used for error messages
    pub fn from_json(content: &str, origin: &Path) -> Result<Self, HostError> {
        serde_json::from_str(content).map_err(|source| HostError::Json {
            file: origin.to_path_buf(),
            source,
        })
    }

    pub fn record(&self, id: RecordId) -> Option<&RecordDecl> {
        self.records.get(id.0 as usize)
    }

    pub fn function(&self, id: FunctionId) -> Option<&FunctionDecl> {
        self.functions.get(id.0 as usize)
    }

    /// Display name of a record, with its template arguments when it is a specialization
    ///
    /// A record that appears among its own template arguments prints as `...`
    /// at the point of recursion.
    pub fn record_display_name(&self, id: RecordId) -> String {
        self.record_name_within(id, &mut HashSet::new())
    }

    /// Display name of a type as written
    pub fn type_display_name(&self, ty: &Type) -> String {
        self.type_name_within(ty, &mut HashSet::new())
    }

    // `open` holds the records whose argument lists are being printed
    fn record_name_within(&self, id: RecordId, open: &mut HashSet<RecordId>) -> String {
        let Some(record) = self.record(id) else {
            return "<unknown>".to_string();
        };
        if record.template_args.is_empty() {
            return record.name.clone();
        }
        if !open.insert(id) {
            return "...".to_string();
        }
        let args: Vec<String> = record
            .template_args
            .iter()
            .map(|arg| self.argument_name_within(arg, open))
            .collect();
        open.remove(&id);
        format!("{}<{}>", record.name, args.join(", "))
    }

    fn argument_name_within(&self, arg: &TemplateArgument, open: &mut HashSet<RecordId>) -> String {
        match arg {
            TemplateArgument::Type { ty } => self.type_name_within(ty, open),
            TemplateArgument::Pack { elements } => elements
                .iter()
                .map(|e| self.argument_name_within(e, open))
                .collect::<Vec<_>>()
                .join(", "),
            TemplateArgument::Integral { value } => value.to_string(),
            TemplateArgument::Other => "...".to_string(),
        }
    }

    fn type_name_within(&self, ty: &Type, open: &mut HashSet<RecordId>) -> String {
        match ty {
            Type::Record { record } => self.record_name_within(*record, open),
            Type::Array { element } => format!("{}[]", self.type_name_within(element, open)),
            Type::Pointer { pointee } => format!("{}*", self.type_name_within(pointee, open)),
            Type::Reference { referee } => format!("{}&", self.type_name_within(referee, open)),
            Type::Alias { name, .. } => name.clone(),
            Type::Builtin { name } => name.clone(),
            Type::Dependent => "<dependent type>".to_string(),
        }
    }
}
