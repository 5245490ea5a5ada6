//! Embedded type-checking service: symbol resolution, type evaluation,
//! property lookup and assignability over a loaded [`Project`].

pub mod assignability;
pub mod builtins;
mod evaluate;
pub mod properties;
pub mod symbols;
pub mod types;

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use errcontract_core::types::collections::{FxHashMap, FxHashSet};

use crate::project::{FileId, Project};
use crate::syntax::ast::{Binding, Expr, TypeNode};

pub use symbols::{DeclRef, Resolver, Space, Symbol};
pub use types::{ObjectType, Property, Type};

/// Type parameter bindings while instantiating a generic declaration.
pub(crate) type TypeEnv = FxHashMap<String, Type>;

/// Answers the type queries of the contract check.
///
/// Evaluation results of non-generic declarations are memoized; re-entering
/// a declaration that is still being evaluated yields `any`.
pub struct TypeChecker {
    project: Project,
    strict: bool,
    value_types: RefCell<FxHashMap<DeclRef, Type>>,
    declared_types: RefCell<FxHashMap<DeclRef, Type>>,
    in_progress: RefCell<FxHashSet<(DeclRef, Space)>>,
    instantiation_depth: Cell<usize>,
}

impl TypeChecker {
    pub fn new(project: Project) -> Self {
        let strict = project.strict_null_checks();
        Self {
            project,
            strict,
            value_types: RefCell::new(FxHashMap::default()),
            declared_types: RefCell::new(FxHashMap::default()),
            in_progress: RefCell::new(FxHashSet::default()),
            instantiation_depth: Cell::new(0),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.project)
    }

    pub fn strict_null_checks(&self) -> bool {
        self.strict
    }

    /// Type denoted by a type annotation written in `file`.
    pub fn type_from_node(&self, file: FileId, node: &TypeNode) -> Type {
        self.eval_type(file, node, &TypeEnv::default())
    }

    /// Type of an expression in `file`, with `scope` the local bindings
    /// visible at the expression (outermost first).
    pub fn type_of_expr(&self, file: FileId, expr: &Expr, scope: &[Arc<Binding>]) -> Type {
        self.eval_expr(file, expr, scope, evaluate::Mode::Regular)
    }

    /// Type named `name` at module scope of `file`.
    pub fn named_type(&self, file: FileId, name: &str) -> Type {
        let node = TypeNode::Ref {
            name: vec![name.to_string()],
            args: Vec::new(),
        };
        self.eval_type(file, &node, &TypeEnv::default())
    }

    /// Type of the value `name` at module scope of `file`.
    pub fn value_type_of(&self, file: FileId, name: &str) -> Type {
        let expr = Expr::Ident(name.to_string());
        self.eval_expr(file, &expr, &[], evaluate::Mode::Regular)
    }

    /// Declared property `name` of `ty`.
    pub fn property_of(&self, ty: &Type, name: &str) -> Option<Type> {
        properties::property_of(ty, name, self.strict)
    }

    /// Every declared property of `ty`.
    pub fn properties_of(&self, ty: &Type) -> Vec<(String, Type)> {
        properties::properties_of(ty, self.strict)
    }

    pub fn is_assignable(&self, source: &Type, target: &Type) -> bool {
        assignability::is_assignable(source, target, self.strict)
    }
}
