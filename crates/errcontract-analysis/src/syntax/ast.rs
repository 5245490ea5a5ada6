//! Lowered syntax model.
//!
//! Tree-sitter's concrete tree is converted once into these closed enums.
//! Every consumer matches on variants; nothing downstream inspects node kind
//! strings. Only the shapes the contract check and the type evaluator need are
//! modelled; everything else lowers to an `Other`/`Unsupported` variant.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Source location of a node. Lines are 1-based; offsets are byte offsets
/// into the file, leading trivia excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start_line: u32,
    pub end_line: u32,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl Span {
    pub fn from_ts_node(node: &tree_sitter::Node) -> Self {
        Self {
            start_line: node.start_position().row as u32 + 1,
            end_line: node.end_position().row as u32 + 1,
            start_offset: node.start_byte(),
            end_offset: node.end_byte(),
        }
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start_offset <= other.start_offset && other.end_offset <= self.end_offset
    }
}

/// One parsed and lowered source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// `.d.ts` / `.d.mts` / `.d.cts`: every declaration is ambient.
    pub is_declaration_file: bool,
    /// Top-level declarations in source order.
    pub items: Vec<Item>,
    /// Every throw statement in the file, in source order.
    pub throws: Vec<ThrowSite>,
    /// Number of ERROR/MISSING nodes tree-sitter recovered from.
    pub parse_errors: u32,
}

impl SourceFile {
    /// True when the file has `import`/`export` syntax, i.e. is an ES module
    /// rather than a global script.
    pub fn is_module(&self) -> bool {
        self.items.iter().any(|item| match item {
            Item::Import(_) | Item::Export(_) => true,
            Item::Class(c) => c.modifiers.exported,
            Item::Variable(v) => v.modifiers.exported,
            Item::Function(f) => f.modifiers.exported,
            Item::TypeAlias(t) => t.modifiers.exported,
            Item::Interface(i) => i.modifiers.exported,
        })
    }

    /// Top-level class declarations with their item index.
    pub fn classes(&self) -> impl Iterator<Item = (usize, &ClassDecl)> {
        self.items.iter().enumerate().filter_map(|(i, item)| match item {
            Item::Class(c) => Some((i, c)),
            _ => None,
        })
    }
}

/// Declaration-level modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// `export` modifier or `export default`.
    pub exported: bool,
    pub default_export: bool,
    /// `declare` modifier.
    pub ambient: bool,
}

/// A top-level declaration.
#[derive(Debug, Clone)]
pub enum Item {
    Import(ImportDecl),
    Export(ExportDecl),
    Class(ClassDecl),
    Variable(VariableDecl),
    Function(FunctionDecl),
    TypeAlias(TypeAliasDecl),
    Interface(InterfaceDecl),
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub source: String,
    pub type_only: bool,
    pub bindings: Vec<ImportBinding>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    /// `import local from '...'`
    Default { local: String },
    /// `import { imported as local } from '...'`
    Named { imported: String, local: String },
    /// `import * as local from '...'`
    Namespace { local: String },
}

impl ImportBinding {
    pub fn local(&self) -> &str {
        match self {
            Self::Default { local } | Self::Named { local, .. } | Self::Namespace { local } => {
                local
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum ExportDecl {
    /// `export { a, b as c }` or `export { a } from '...'`
    Named {
        specifiers: Vec<ExportSpecifier>,
        source: Option<String>,
    },
    /// `export * from '...'` or `export * as ns from '...'`
    All { source: String, alias: Option<String> },
    /// `export default <expression>;`
    DefaultExpr { expr: Expr },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
}

/// A top-level class declaration, including anonymous `export default class`.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: Option<String>,
    pub modifiers: Modifiers,
    pub is_abstract: bool,
    pub heritage: Option<Heritage>,
    pub type_params: Vec<TypeParam>,
    /// Instance fields and methods, for the class instance type.
    pub members: Vec<PropertySignature>,
    pub span: Span,
}

impl ClassDecl {
    /// Name used in logs and diagnostics; anonymous default classes are `default`.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("default")
    }
}

/// The `extends` clause of a class.
#[derive(Debug, Clone)]
pub struct Heritage {
    pub base: Expr,
    pub type_args: Vec<TypeNode>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarKind {
    Const,
    Let,
    Var,
}

#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub name: String,
    pub kind: VarKind,
    pub type_ann: Option<TypeNode>,
    pub init: Option<Expr>,
    pub modifiers: Modifiers,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub return_type: Option<TypeNode>,
    pub modifiers: Modifiers,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeParam {
    pub name: String,
    pub default: Option<TypeNode>,
}

#[derive(Debug, Clone)]
pub struct TypeAliasDecl {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub value: TypeNode,
    pub modifiers: Modifiers,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TypeNode>,
    pub members: Vec<PropertySignature>,
    pub index: Option<TypeNode>,
    pub modifiers: Modifiers,
    pub span: Span,
}

/// A property in an object type, interface body, or class body.
/// `ty == None` means the declared type is unknown to the front end.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySignature {
    pub name: String,
    pub ty: Option<TypeNode>,
    pub optional: bool,
    pub readonly: bool,
}

/// Expressions the type evaluator understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    This,
    Member { object: Box<Expr>, property: String },
    Index { object: Box<Expr>, index: Box<Expr> },
    Str(String),
    /// Canonical decimal text of a numeric literal.
    Number(String),
    Bool(bool),
    Null,
    /// Template literal with substitutions.
    Template,
    Object(Vec<ObjectMember>),
    Array(Vec<Expr>),
    New(NewExpr),
    Call { callee: Box<Expr>, args: Vec<Expr> },
    As { expr: Box<Expr>, ty: Box<TypeNode> },
    /// `expr as const`
    AsConst(Box<Expr>),
    Satisfies { expr: Box<Expr>, ty: Box<TypeNode> },
    NonNull(Box<Expr>),
    Spread(Box<Expr>),
    /// `test ? consequent : alternate`; the test does not affect the type.
    Conditional {
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Function and arrow expressions.
    Function,
    /// Any other expression kind, by tree-sitter kind name.
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// `&&`
    And,
    /// `||`
    Or,
    /// `??`
    Nullish,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectMember {
    Property { key: String, value: Expr },
    Shorthand(String),
    Spread(Expr),
    Method(String),
    /// `[expr]: value`, key not statically known.
    Computed,
}

/// `new Callee(args)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr {
    pub callee: Box<Expr>,
    /// Source text of the constructor expression, e.g. `ApiError`.
    pub callee_text: String,
    /// `None` when written without parentheses (`new ApiError`).
    pub args: Option<Vec<Expr>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Any,
    Unknown,
    Never,
    Void,
    Undefined,
    Null,
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    Object,
}

impl Keyword {
    pub fn from_text(text: &str) -> Option<Self> {
        Some(match text {
            "any" => Self::Any,
            "unknown" => Self::Unknown,
            "never" => Self::Never,
            "void" => Self::Void,
            "undefined" => Self::Undefined,
            "null" => Self::Null,
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "bigint" => Self::BigInt,
            "symbol" => Self::Symbol,
            "object" => Self::Object,
            _ => return None,
        })
    }
}

/// Type annotations.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Keyword(Keyword),
    StrLit(String),
    NumLit(String),
    BoolLit(bool),
    /// `Name`, `ns.Name`, `Name<Args>`
    Ref { name: Vec<String>, args: Vec<TypeNode> },
    /// `typeof a.b.c`
    Query(Vec<String>),
    Object {
        members: Vec<PropertySignature>,
        index: Option<Box<TypeNode>>,
    },
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    Array(Box<TypeNode>),
    Tuple(Vec<TypeNode>),
    /// `readonly T[]` / `readonly [A, B]`
    Readonly(Box<TypeNode>),
    /// `T[K]`
    Indexed { object: Box<TypeNode>, index: Box<TypeNode> },
    /// Any other type form, by tree-sitter kind name.
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Const,
    Let,
    Var,
    Param,
    Catch,
    Function,
    Class,
}

/// A local (non-module-scope) binding visible at a throw site.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    pub type_ann: Option<TypeNode>,
    pub init: Option<Expr>,
}

/// A `throw` statement.
#[derive(Debug, Clone)]
pub struct ThrowSite {
    pub expr: Expr,
    pub span: Span,
    /// Item index of the enclosing top-level class, if any.
    pub owner: Option<usize>,
    /// Local bindings in scope, outermost first.
    pub scope: Vec<Arc<Binding>>,
}
