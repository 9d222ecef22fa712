//! Test utilities for gcsafe integration tests
#![allow(dead_code)]

use gcsafe::host::{
    CallExpr, ConstructExpr, FieldDecl, FunctionDecl, FunctionId, NewExpr, Node, RecordDecl,
    RecordId, SourceLocation, SourceRange, TemplateArgument, TranslationUnit, Type, VarDecl,
    VarStorage,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Result type alias for tests
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Extract Ok value or panic with context
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("assertion failed: expected Ok, got Err({:?})", e),
        }
    };
    ($expr:expr, $msg:literal) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Extract Some value or panic with context
#[macro_export]
macro_rules! assert_some {
    ($expr:expr) => {
        match $expr {
            Some(v) => v,
            None => panic!("assertion failed: expected Some, got None"),
        }
    };
    ($expr:expr, $msg:literal) => {
        match $expr {
            Some(v) => v,
            None => panic!("{}: got None", $msg),
        }
    };
}

pub const MANAGED_BASE: &str = "cppgc::GarbageCollected";

/// Builds translation units in code
///
/// Record 0 is always the managed-allocation base.
#[derive(Debug)]
pub struct TuBuilder {
    tu: TranslationUnit,
}

impl TuBuilder {
    pub fn new(main_file: &str) -> Self {
        let mut builder = Self {
            tu: TranslationUnit {
                main_file: main_file.to_string(),
                ..Default::default()
            },
        };
        builder.record(MANAGED_BASE, vec![]);
        builder
    }

    pub fn base(&self) -> RecordId {
        RecordId(0)
    }

    /// Add a record declared at `<name>.h:1:7` under /src/third_party/blink/renderer
    pub fn record(&mut self, name: &str, bases: Vec<RecordId>) -> RecordId {
        let file = format!(
            "/src/third_party/blink/renderer/{}.h",
            name.rsplit("::").next().unwrap_or(name).to_lowercase()
        );
        self.push_record(RecordDecl {
            name: name.to_string(),
            template_args: vec![],
            bases,
            location: SourceLocation::new(file, 1, 7),
            annotations: vec![],
        })
    }

    /// Add a record deriving from the managed base
    pub fn managed(&mut self, name: &str) -> RecordId {
        let base = self.base();
        self.record(name, vec![base])
    }

    pub fn annotated_record(&mut self, name: &str, annotation: &str) -> RecordId {
        let id = self.record(name, vec![]);
        self.tu.records[id.0 as usize]
            .annotations
            .push(annotation.to_string());
        id
    }

    /// Add a class-template specialization such as `std::optional<T>`
    pub fn specialization(&mut self, template: &str, args: Vec<TemplateArgument>) -> RecordId {
        self.push_record(RecordDecl {
            name: template.to_string(),
            template_args: args,
            bases: vec![],
            location: SourceLocation::new("/usr/include/c++/v1/template.h", 1, 1)
                .in_system_header(),
            annotations: vec![],
        })
    }

    pub fn function(&mut self, name: &str, args: Vec<TemplateArgument>) -> FunctionId {
        self.tu.functions.push(FunctionDecl {
            name: name.to_string(),
            template_args: args,
            location: SourceLocation::default(),
        });
        FunctionId(self.tu.functions.len() as u32 - 1)
    }

    pub fn decl(&mut self, node: Node) -> &mut Self {
        self.tu.decls.push(node);
        self
    }

    pub fn build(&self) -> TranslationUnit {
        self.tu.clone()
    }

    fn push_record(&mut self, record: RecordDecl) -> RecordId {
        self.tu.records.push(record);
        RecordId(self.tu.records.len() as u32 - 1)
    }
}

pub fn at(file: &str, line: u32, column: u32) -> SourceLocation {
    SourceLocation::new(file, line, column)
}

pub fn ty(record: RecordId) -> TemplateArgument {
    TemplateArgument::of_type(Type::record(record))
}

pub fn builtin(name: &str) -> TemplateArgument {
    TemplateArgument::of_type(Type::builtin(name))
}

pub fn call(callee: FunctionId, loc: SourceLocation) -> Node {
    Node::Call(CallExpr {
        callee,
        range: SourceRange::at(loc),
        args: vec![],
    })
}

pub fn construct(record: RecordId, loc: SourceLocation) -> Node {
    Node::Construct(ConstructExpr {
        record,
        range: SourceRange::at(loc),
        args: vec![],
    })
}

/// `new T(...)` whose initializer constructs `record`
pub fn new_of(record: RecordId, loc: SourceLocation) -> Node {
    Node::New(NewExpr {
        allocated: Type::record(record),
        range: SourceRange::at(loc.clone()),
        init: Some(Box::new(construct(record, loc))),
    })
}

pub fn field(name: &str, record: RecordId, loc: SourceLocation) -> Node {
    Node::Field(FieldDecl {
        name: name.to_string(),
        ty: Type::record(record),
        location: loc,
        annotations: vec![],
    })
}

pub fn var(name: &str, record: RecordId, storage: VarStorage, loc: SourceLocation) -> VarDecl {
    VarDecl {
        name: name.to_string(),
        ty: Type::record(record),
        location: loc,
        storage,
        annotations: vec![],
        init: None,
    }
}

pub fn function_body(function: FunctionId, body: Vec<Node>) -> Node {
    Node::Function { function, body }
}

pub fn record_body(record: RecordId, children: Vec<Node>) -> Node {
    Node::Record { record, children }
}

/// Write a unit as `<dir>/<name>.ast.json`
pub fn write_dump(dir: &Path, name: &str, tu: &TranslationUnit) -> PathBuf {
    let path = dir.join(format!("{name}.ast.json"));
    fs::write(&path, serde_json::to_string_pretty(tu).unwrap()).unwrap();
    path
}

/// A unit with one `std::make_unique<blink::Node>()` call in `file`
pub fn make_unique_unit(file: &str) -> TranslationUnit {
    let mut b = TuBuilder::new(file);
    let node = b.managed("blink::Node");
    let factory = b.function("std::make_unique", vec![ty(node)]);
    let caller = b.function("content::Create", vec![]);
    b.decl(function_body(caller, vec![call(factory, at(file, 12, 5))]));
    b.build()
}
