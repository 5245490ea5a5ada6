//! Type evaluation for type annotations and expressions.
//!
//! Literal widening follows the compiler for the cases that matter here:
//! `const` declarations keep literal types, `let`/`var` and object literal
//! properties widen them, and `as const` keeps literals, marks properties
//! readonly and turns array literals into readonly tuples. Contextual typing
//! is not modelled. Names that do not resolve evaluate to `any`.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::builtins;
use super::properties::{access_property, properties_of};
use super::symbols::{DeclRef, Space, Symbol};
use super::types::{ObjectType, Property, Type};
use super::{TypeChecker, TypeEnv};
use crate::project::FileId;
use crate::syntax::ast::{
    Binding, BindingKind, ClassDecl, Expr, InterfaceDecl, Item, Keyword, LogicalOp, ObjectMember,
    TypeNode, TypeParam, VarKind,
};

const MAX_INSTANTIATION_DEPTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Regular,
    /// Inside `as const`.
    Const,
}

impl TypeChecker {
    pub(crate) fn eval_type(&self, file: FileId, node: &TypeNode, env: &TypeEnv) -> Type {
        match node {
            TypeNode::Keyword(keyword) => keyword_type(*keyword),
            TypeNode::StrLit(value) => Type::StringLiteral(value.clone()),
            TypeNode::NumLit(value) => Type::NumberLiteral(value.clone()),
            TypeNode::BoolLit(value) => Type::BooleanLiteral(*value),
            TypeNode::Ref { name, args } => self.eval_reference(file, name, args, env),
            TypeNode::Query(path) => self.eval_query(file, path),
            TypeNode::Object { members, index } => ObjectType {
                properties: members
                    .iter()
                    .map(|m| {
                        let ty = m
                            .ty
                            .as_ref()
                            .map(|t| self.eval_type(file, t, env))
                            .unwrap_or(Type::Any);
                        (
                            m.name.clone(),
                            Property {
                                ty,
                                optional: m.optional,
                                readonly: m.readonly,
                            },
                        )
                    })
                    .collect(),
                index: index
                    .as_ref()
                    .map(|t| Box::new(self.eval_type(file, t, env))),
            }
            .into_type(),
            TypeNode::Union(members) => {
                Type::union(members.iter().map(|m| self.eval_type(file, m, env)))
            }
            TypeNode::Intersection(members) => {
                Type::intersection(members.iter().map(|m| self.eval_type(file, m, env)))
            }
            TypeNode::Array(element) => Type::Array {
                element: Box::new(self.eval_type(file, element, env)),
                readonly: false,
            },
            TypeNode::Tuple(elements) => Type::Tuple {
                elements: elements
                    .iter()
                    .map(|e| self.eval_type(file, e, env))
                    .collect(),
                readonly: false,
            },
            TypeNode::Readonly(inner) => self.eval_type(file, inner, env).into_readonly(),
            TypeNode::Indexed { object, index } => {
                let object = self.eval_type(file, object, env);
                let index = self.eval_type(file, index, env);
                self.eval_indexed(&object, &index)
            }
            TypeNode::Unsupported(kind) => {
                tracing::trace!(kind = %kind, "unsupported type form evaluates to any");
                Type::Any
            }
        }
    }

    fn eval_reference(
        &self,
        file: FileId,
        name: &[String],
        args: &[TypeNode],
        env: &TypeEnv,
    ) -> Type {
        if let [single] = name {
            if let Some(bound) = env.get(single) {
                return bound.clone();
            }
        }
        let args: Vec<Type> = args.iter().map(|a| self.eval_type(file, a, env)).collect();
        let declared = self
            .resolver()
            .resolve_qualified(file, name, Space::Type)
            .into_iter()
            .find_map(|s| match s {
                Symbol::Decl(decl) => Some(decl),
                _ => None,
            });
        if let Some(decl) = declared {
            return self.declared_type(decl, &args);
        }
        match name {
            [single] => builtins::instantiate(single, &args, self.strict).unwrap_or(Type::Any),
            _ => Type::Any,
        }
    }

    /// Type named by a type-space declaration, instantiated with `args`.
    pub(crate) fn declared_type(&self, decl: DeclRef, args: &[Type]) -> Type {
        let Some(item) = self.resolver().item(decl) else {
            return Type::Any;
        };
        let generic = match item {
            Item::TypeAlias(alias) => !alias.type_params.is_empty(),
            Item::Interface(interface) => !interface.type_params.is_empty(),
            _ => false,
        };
        if generic {
            return self.instantiate(decl, item, args);
        }

        if let Some(cached) = self.declared_types.borrow().get(&decl) {
            return cached.clone();
        }
        if !self.in_progress.borrow_mut().insert((decl, Space::Type)) {
            return Type::Any;
        }
        let empty = TypeEnv::default();
        let ty = match item {
            Item::TypeAlias(alias) => self.eval_type(decl.file, &alias.value, &empty),
            Item::Interface(interface) => self.interface_type(decl.file, interface, &empty),
            Item::Class(class) => self.instance_type(decl, class),
            _ => Type::Any,
        };
        self.in_progress.borrow_mut().remove(&(decl, Space::Type));
        self.declared_types.borrow_mut().insert(decl, ty.clone());
        ty
    }

    fn instantiate(&self, decl: DeclRef, item: &Item, args: &[Type]) -> Type {
        let depth = self.instantiation_depth.get();
        if depth >= MAX_INSTANTIATION_DEPTH {
            return Type::Any;
        }
        self.instantiation_depth.set(depth + 1);
        let ty = match item {
            Item::TypeAlias(alias) => {
                let env = self.bind_type_params(decl.file, &alias.type_params, args);
                self.eval_type(decl.file, &alias.value, &env)
            }
            Item::Interface(interface) => {
                let env = self.bind_type_params(decl.file, &interface.type_params, args);
                self.interface_type(decl.file, interface, &env)
            }
            _ => Type::Any,
        };
        self.instantiation_depth.set(depth);
        ty
    }

    fn bind_type_params(&self, file: FileId, params: &[TypeParam], args: &[Type]) -> TypeEnv {
        let mut env = TypeEnv::default();
        for (i, param) in params.iter().enumerate() {
            let ty = match args.get(i) {
                Some(arg) => arg.clone(),
                None => param
                    .default
                    .as_ref()
                    .map(|d| self.eval_type(file, d, &env))
                    .unwrap_or(Type::Any),
            };
            env.insert(param.name.clone(), ty);
        }
        env
    }

    fn interface_type(&self, file: FileId, interface: &InterfaceDecl, env: &TypeEnv) -> Type {
        let own = ObjectType {
            properties: interface
                .members
                .iter()
                .map(|m| {
                    let ty = m
                        .ty
                        .as_ref()
                        .map(|t| self.eval_type(file, t, env))
                        .unwrap_or(Type::Any);
                    (
                        m.name.clone(),
                        Property {
                            ty,
                            optional: m.optional,
                            readonly: m.readonly,
                        },
                    )
                })
                .collect(),
            index: interface
                .index
                .as_ref()
                .map(|t| Box::new(self.eval_type(file, t, env))),
        }
        .into_type();
        if interface.extends.is_empty() {
            return own;
        }
        let mut parts: Vec<Type> = interface
            .extends
            .iter()
            .map(|base| self.eval_type(file, base, env))
            .collect();
        parts.push(own);
        Type::intersection(parts)
    }

    /// Instance type of a class: its fields and methods over those of its
    /// base class.
    fn instance_type(&self, decl: DeclRef, class: &ClassDecl) -> Type {
        let empty = TypeEnv::default();
        let own: BTreeMap<String, Property> = class
            .members
            .iter()
            .map(|m| {
                let ty = m
                    .ty
                    .as_ref()
                    .map(|t| self.eval_type(decl.file, t, &empty))
                    .unwrap_or(Type::Any);
                (
                    m.name.clone(),
                    Property {
                        ty,
                        optional: m.optional,
                        readonly: m.readonly,
                    },
                )
            })
            .collect();

        let base = class
            .heritage
            .as_ref()
            .and_then(|h| match &h.base {
                Expr::Ident(name) => Some(name),
                _ => None,
            })
            .and_then(|name| {
                self.resolver()
                    .resolve_local(decl.file, name, Space::Type)
                    .into_iter()
                    .find_map(|s| match s {
                        Symbol::Decl(d) => Some(d),
                        _ => None,
                    })
            })
            .map(|d| self.declared_type(d, &[]));

        let mut object = match base {
            Some(Type::Object(base)) => (*base).clone(),
            _ => ObjectType::default(),
        };
        object.properties.extend(own);
        object.into_type()
    }

    fn eval_query(&self, file: FileId, path: &[String]) -> Type {
        let Some((first, rest)) = path.split_first() else {
            return Type::Any;
        };
        match self.resolver().resolve_local(file, first, Space::Value).first() {
            Some(Symbol::Module(module)) => self.module_member_type(*module, rest),
            Some(Symbol::Decl(decl)) => {
                let base = self.value_type(*decl);
                rest.iter()
                    .fold(base, |t, segment| access_property(&t, segment, self.strict))
            }
            _ => Type::Any,
        }
    }

    /// Type of `ns.a.b` where `ns` is the module `module`.
    fn module_member_type(&self, module: FileId, path: &[String]) -> Type {
        let mut module = module;
        for (i, segment) in path.iter().enumerate() {
            match self
                .resolver()
                .resolve_export(module, segment, Space::Value)
                .first()
            {
                Some(Symbol::Module(next)) => module = *next,
                Some(Symbol::Decl(decl)) => {
                    let base = self.value_type(*decl);
                    return path[i + 1..]
                        .iter()
                        .fold(base, |t, segment| access_property(&t, segment, self.strict));
                }
                _ => return Type::Any,
            }
        }
        Type::Any
    }

    /// Declared or inferred type of a value declaration.
    pub(crate) fn value_type(&self, decl: DeclRef) -> Type {
        if let Some(cached) = self.value_types.borrow().get(&decl) {
            return cached.clone();
        }
        if !self.in_progress.borrow_mut().insert((decl, Space::Value)) {
            return Type::Any;
        }
        let ty = match self.resolver().item(decl) {
            Some(Item::Variable(var)) => match (&var.type_ann, &var.init) {
                (Some(annotation), _) => {
                    self.eval_type(decl.file, annotation, &TypeEnv::default())
                }
                (None, Some(init)) => {
                    let ty = self.eval_expr(decl.file, init, &[], Mode::Regular);
                    if var.kind == VarKind::Const {
                        ty
                    } else {
                        widen_fresh(init, ty)
                    }
                }
                (None, None) => Type::Any,
            },
            _ => Type::Any,
        };
        self.in_progress.borrow_mut().remove(&(decl, Space::Value));
        self.value_types.borrow_mut().insert(decl, ty.clone());
        ty
    }

    fn eval_indexed(&self, object: &Type, index: &Type) -> Type {
        Type::union(index.members().iter().map(|key| match key {
            Type::StringLiteral(k) | Type::NumberLiteral(k) => {
                access_property(object, k, self.strict)
            }
            Type::Number => match object {
                Type::Array { element, .. } => (**element).clone(),
                Type::Tuple { elements, .. } => Type::union(elements.iter().cloned()),
                Type::Object(o) => o.index.as_deref().cloned().unwrap_or(Type::Any),
                _ => Type::Any,
            },
            Type::String => match object {
                Type::Object(o) => o.index.as_deref().cloned().unwrap_or(Type::Any),
                _ => Type::Any,
            },
            _ => Type::Any,
        }))
    }

    pub(crate) fn eval_expr(
        &self,
        file: FileId,
        expr: &Expr,
        scope: &[Arc<Binding>],
        mode: Mode,
    ) -> Type {
        match expr {
            Expr::Ident(name) => self.eval_ident(file, name, scope),
            Expr::This => Type::Any,
            Expr::Member { object, property } => {
                if let Some(module) = self.namespace_of(file, object, scope) {
                    return self.module_member_type(module, std::slice::from_ref(property));
                }
                let object = self.eval_expr(file, object, scope, Mode::Regular);
                access_property(&object, property, self.strict)
            }
            Expr::Index { object, index } => {
                let object = self.eval_expr(file, object, scope, Mode::Regular);
                let index = self.eval_expr(file, index, scope, Mode::Regular);
                self.eval_indexed(&object, &index)
            }
            Expr::Str(value) => Type::StringLiteral(value.clone()),
            Expr::Number(value) => Type::NumberLiteral(value.clone()),
            Expr::Bool(value) => Type::BooleanLiteral(*value),
            Expr::Null => Type::Null,
            Expr::Template => Type::String,
            Expr::Object(members) => self.eval_object(file, members, scope, mode),
            Expr::Array(elements) => self.eval_array(file, elements, scope, mode),
            Expr::New(new) => match new.callee.as_ref() {
                Expr::Ident(name) if !in_scope(scope, name) => {
                    match self.value_decl(file, name) {
                        Some((decl, Item::Class(_))) => self.declared_type(decl, &[]),
                        _ => Type::Any,
                    }
                }
                _ => Type::Any,
            },
            Expr::Call { callee, .. } => match callee.as_ref() {
                Expr::Ident(name) if !in_scope(scope, name) => {
                    match self.value_decl(file, name) {
                        Some((decl, Item::Function(function))) => function
                            .return_type
                            .as_ref()
                            .map(|t| self.eval_type(decl.file, t, &TypeEnv::default()))
                            .unwrap_or(Type::Any),
                        _ => Type::Any,
                    }
                }
                _ => Type::Any,
            },
            Expr::As { ty, .. } => self.eval_type(file, ty, &TypeEnv::default()),
            Expr::AsConst(inner) => self.eval_expr(file, inner, scope, Mode::Const),
            Expr::Satisfies { expr, .. } => self.eval_expr(file, expr, scope, mode),
            Expr::NonNull(inner) => self.eval_expr(file, inner, scope, mode).non_nullable(),
            Expr::Conditional {
                consequent,
                alternate,
            } => Type::union([
                self.eval_expr(file, consequent, scope, mode),
                self.eval_expr(file, alternate, scope, mode),
            ]),
            Expr::Logical { op, left, right } => {
                let left = self.eval_expr(file, left, scope, mode);
                let right = self.eval_expr(file, right, scope, mode);
                if left == Type::Any {
                    return Type::Any;
                }
                match op {
                    LogicalOp::Nullish => Type::union([left.non_nullable(), right]),
                    LogicalOp::Or => Type::union([left.truthy(), right]),
                    LogicalOp::And => Type::union([left.falsy(), right]),
                }
            }
            Expr::Spread(_) | Expr::Function | Expr::Other(_) => Type::Any,
        }
    }

    fn eval_ident(&self, file: FileId, name: &str, scope: &[Arc<Binding>]) -> Type {
        if let Some(pos) = scope.iter().rposition(|b| b.name == name) {
            return self.binding_type(file, &scope[pos], &scope[..pos]);
        }
        match name {
            "undefined" => return Type::Undefined,
            "NaN" | "Infinity" => return Type::Number,
            _ => {}
        }
        match self.resolver().resolve_local(file, name, Space::Value).first() {
            Some(Symbol::Decl(decl)) => self.value_type(*decl),
            _ => Type::Any,
        }
    }

    /// Type of a local binding; its initializer sees only the bindings
    /// declared before it.
    fn binding_type(&self, file: FileId, binding: &Binding, outer: &[Arc<Binding>]) -> Type {
        if let Some(annotation) = &binding.type_ann {
            return self.eval_type(file, annotation, &TypeEnv::default());
        }
        match (binding.kind, &binding.init) {
            (BindingKind::Const, Some(init)) => self.eval_expr(file, init, outer, Mode::Regular),
            (BindingKind::Let | BindingKind::Var | BindingKind::Param, Some(init)) => {
                widen_fresh(init, self.eval_expr(file, init, outer, Mode::Regular))
            }
            _ => Type::Any,
        }
    }

    fn namespace_of(&self, file: FileId, expr: &Expr, scope: &[Arc<Binding>]) -> Option<FileId> {
        let Expr::Ident(name) = expr else {
            return None;
        };
        if in_scope(scope, name) {
            return None;
        }
        match self.resolver().resolve_local(file, name, Space::Value).first() {
            Some(Symbol::Module(module)) => Some(*module),
            _ => None,
        }
    }

    fn value_decl(&self, file: FileId, name: &str) -> Option<(DeclRef, &Item)> {
        self.resolver()
            .resolve_local(file, name, Space::Value)
            .into_iter()
            .find_map(|s| match s {
                Symbol::Decl(decl) => Some(decl),
                _ => None,
            })
            .and_then(|decl| {
                self.project
                    .file(decl.file)
                    .items
                    .get(decl.item)
                    .map(|item| (decl, item))
            })
    }

    fn eval_object(
        &self,
        file: FileId,
        members: &[ObjectMember],
        scope: &[Arc<Binding>],
        mode: Mode,
    ) -> Type {
        let readonly = mode == Mode::Const;
        let fresh = |ty: Type| Property {
            ty: if readonly { ty } else { ty.widen() },
            optional: false,
            readonly,
        };
        let mut properties = BTreeMap::new();
        for member in members {
            match member {
                ObjectMember::Property { key, value } => {
                    let ty = self.eval_expr(file, value, scope, mode);
                    properties.insert(key.clone(), fresh(ty));
                }
                ObjectMember::Shorthand(name) => {
                    let ty = self.eval_ident(file, name, scope);
                    properties.insert(name.clone(), fresh(ty));
                }
                ObjectMember::Spread(inner) => {
                    let spread = self.eval_expr(file, inner, scope, Mode::Regular);
                    for (name, ty) in properties_of(&spread, self.strict) {
                        properties.insert(
                            name,
                            Property {
                                ty,
                                optional: false,
                                readonly,
                            },
                        );
                    }
                }
                ObjectMember::Method(name) => {
                    properties.insert(name.clone(), fresh(Type::Any));
                }
                ObjectMember::Computed => {}
            }
        }
        ObjectType {
            properties,
            index: None,
        }
        .into_type()
    }

    fn eval_array(
        &self,
        file: FileId,
        elements: &[Expr],
        scope: &[Arc<Binding>],
        mode: Mode,
    ) -> Type {
        if mode == Mode::Const {
            return Type::Tuple {
                elements: elements
                    .iter()
                    .map(|e| match e {
                        Expr::Spread(_) => Type::Any,
                        other => self.eval_expr(file, other, scope, Mode::Const),
                    })
                    .collect(),
                readonly: true,
            };
        }
        if elements.is_empty() {
            return Type::Array {
                element: Box::new(if self.strict { Type::Never } else { Type::Any }),
                readonly: false,
            };
        }
        let element = Type::union(elements.iter().map(|e| match e {
            Expr::Spread(inner) => match self.eval_expr(file, inner, scope, Mode::Regular) {
                Type::Array { element, .. } => *element,
                Type::Tuple { elements, .. } => Type::union(elements),
                _ => Type::Any,
            },
            other => self.eval_expr(file, other, scope, Mode::Regular).widen(),
        }));
        Type::Array {
            element: Box::new(element),
            readonly: false,
        }
    }
}

/// Literals written in a mutable binding's initializer widen; literal types
/// read from declarations are kept.
fn widen_fresh(init: &Expr, ty: Type) -> Type {
    if reads_declared(init) {
        ty
    } else {
        ty.widen()
    }
}

fn reads_declared(expr: &Expr) -> bool {
    match expr {
        Expr::Member { .. } | Expr::Index { .. } | Expr::As { .. } | Expr::Call { .. } => true,
        Expr::NonNull(inner) | Expr::Satisfies { expr: inner, .. } => reads_declared(inner),
        Expr::Conditional {
            consequent,
            alternate,
        } => reads_declared(consequent) && reads_declared(alternate),
        Expr::Logical { left, right, .. } => reads_declared(left) && reads_declared(right),
        _ => false,
    }
}

fn in_scope(scope: &[Arc<Binding>], name: &str) -> bool {
    scope.iter().any(|b| b.name == name)
}

fn keyword_type(keyword: Keyword) -> Type {
    match keyword {
        Keyword::Any => Type::Any,
        Keyword::Unknown => Type::Unknown,
        Keyword::Never => Type::Never,
        Keyword::Void => Type::Void,
        Keyword::Undefined => Type::Undefined,
        Keyword::Null => Type::Null,
        Keyword::String => Type::String,
        Keyword::Number => Type::Number,
        Keyword::Boolean => Type::Boolean,
        Keyword::BigInt => Type::BigInt,
        Keyword::Symbol => Type::Symbol,
        Keyword::Object => Type::NonPrimitive,
    }
}
