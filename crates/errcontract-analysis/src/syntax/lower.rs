//! Lowering from tree-sitter's concrete syntax tree into the closed enums of
//! [`super::ast`].
//!
//! Two things happen in one pass over every top-level statement:
//! - declarations are lowered into [`Item`]s (imports, exports, classes,
//!   variables, functions, type aliases, interfaces);
//! - every `throw` statement is recorded as a [`ThrowSite`] together with the
//!   local bindings visible at that point and the top-level class it sits in.
//!
//! ERROR subtrees are skipped entirely.

use std::sync::Arc;

use tree_sitter::Node;

use super::ast::*;

/// Lower a `program` node.
pub fn lower_program(root: Node, src: &[u8]) -> (Vec<Item>, Vec<ThrowSite>) {
    let mut lowerer = Lowerer::new(src);
    for statement in named_children(root) {
        if statement.is_error() {
            continue;
        }
        let first_item = lowerer.items.len();
        lowerer.lower_statement(statement, Modifiers::default());
        lowerer.owner = lowerer.items[first_item..]
            .iter()
            .position(|item| matches!(item, Item::Class(_)))
            .map(|offset| first_item + offset);
        lowerer.walk(statement);
        lowerer.owner = None;
    }
    (lowerer.items, lowerer.throws)
}

struct Lowerer<'a> {
    src: &'a [u8],
    items: Vec<Item>,
    throws: Vec<ThrowSite>,
    /// Local bindings of the enclosing scopes, outermost first.
    scope: Vec<Arc<Binding>>,
    /// Number of nested scopes entered; module scope is 0.
    depth: usize,
    owner: Option<usize>,
}

impl<'a> Lowerer<'a> {
    fn new(src: &'a [u8]) -> Self {
        Self {
            src,
            items: Vec::new(),
            throws: Vec::new(),
            scope: Vec::new(),
            depth: 0,
            owner: None,
        }
    }

    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.src).unwrap_or("")
    }

    // ---- Declarations ----------------------------------------------------

    fn lower_statement(&mut self, node: Node, modifiers: Modifiers) {
        match node.kind() {
            "import_statement" => {
                if let Some(import) = self.lower_import(node) {
                    self.items.push(Item::Import(import));
                }
            }
            "export_statement" => self.lower_export(node),
            "class_declaration" | "abstract_class_declaration" | "class" => {
                let class = self.lower_class(node, modifiers);
                self.items.push(Item::Class(class));
            }
            "lexical_declaration" | "variable_declaration" => {
                self.lower_variables(node, modifiers)
            }
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                if let Some(name) = node.child_by_field_name("name") {
                    let decl = FunctionDecl {
                        name: self.text(name).to_string(),
                        return_type: node
                            .child_by_field_name("return_type")
                            .map(|t| self.lower_type(t)),
                        modifiers,
                        span: Span::from_ts_node(&node),
                    };
                    self.items.push(Item::Function(decl));
                }
            }
            "type_alias_declaration" => {
                let (Some(name), Some(value)) = (
                    node.child_by_field_name("name"),
                    node.child_by_field_name("value"),
                ) else {
                    return;
                };
                let decl = TypeAliasDecl {
                    name: self.text(name).to_string(),
                    type_params: self.lower_type_params(node),
                    value: self.lower_type(value),
                    modifiers,
                    span: Span::from_ts_node(&node),
                };
                self.items.push(Item::TypeAlias(decl));
            }
            "interface_declaration" => {
                if let Some(decl) = self.lower_interface(node, modifiers) {
                    self.items.push(Item::Interface(decl));
                }
            }
            "ambient_declaration" => {
                let ambient = Modifiers {
                    ambient: true,
                    ..modifiers
                };
                for child in named_children(node) {
                    self.lower_statement(child, ambient);
                }
            }
            _ => {}
        }
    }

    fn lower_import(&self, node: Node) -> Option<ImportDecl> {
        let source = node.child_by_field_name("source")?;
        let mut bindings = Vec::new();
        for clause in named_children(node).into_iter().filter(|c| c.kind() == "import_clause") {
            for part in named_children(clause) {
                match part.kind() {
                    "identifier" => bindings.push(ImportBinding::Default {
                        local: self.text(part).to_string(),
                    }),
                    "namespace_import" => {
                        if let Some(id) = first_named(part) {
                            bindings.push(ImportBinding::Namespace {
                                local: self.text(id).to_string(),
                            });
                        }
                    }
                    "named_imports" => {
                        for spec in named_children(part)
                            .into_iter()
                            .filter(|s| s.kind() == "import_specifier")
                        {
                            let Some(name) = spec.child_by_field_name("name") else {
                                continue;
                            };
                            let imported = self.module_export_name(name);
                            let local = spec
                                .child_by_field_name("alias")
                                .map(|a| self.text(a).to_string())
                                .unwrap_or_else(|| imported.clone());
                            bindings.push(ImportBinding::Named { imported, local });
                        }
                    }
                    _ => {}
                }
            }
        }
        Some(ImportDecl {
            source: self.string_value(source),
            type_only: has_token(node, "type"),
            bindings,
            span: Span::from_ts_node(&node),
        })
    }

    fn lower_export(&mut self, node: Node) {
        let default_export = has_token(node, "default");
        let modifiers = Modifiers {
            exported: true,
            default_export,
            ambient: false,
        };

        if let Some(declaration) = node.child_by_field_name("declaration") {
            self.lower_statement(declaration, modifiers);
            return;
        }

        if let Some(value) = node.child_by_field_name("value") {
            if !default_export {
                // `export = value` is not an ES export.
                return;
            }
            match value.kind() {
                "class" | "class_declaration" | "abstract_class_declaration" => {
                    let class = self.lower_class(value, modifiers);
                    self.items.push(Item::Class(class));
                }
                _ => {
                    let expr = self.lower_expr(value);
                    self.items.push(Item::Export(ExportDecl::DefaultExpr { expr }));
                }
            }
            return;
        }

        let source = node
            .child_by_field_name("source")
            .map(|s| self.string_value(s));

        if let Some(clause) = named_children(node)
            .into_iter()
            .find(|c| c.kind() == "export_clause")
        {
            let specifiers = named_children(clause)
                .into_iter()
                .filter(|s| s.kind() == "export_specifier")
                .filter_map(|spec| {
                    let local = self.module_export_name(spec.child_by_field_name("name")?);
                    let exported = spec
                        .child_by_field_name("alias")
                        .map(|a| self.module_export_name(a))
                        .unwrap_or_else(|| local.clone());
                    Some(ExportSpecifier { local, exported })
                })
                .collect();
            self.items
                .push(Item::Export(ExportDecl::Named { specifiers, source }));
            return;
        }

        if let Some(source) = source {
            let alias = named_children(node)
                .into_iter()
                .find(|c| c.kind() == "namespace_export")
                .and_then(first_named)
                .map(|n| self.module_export_name(n));
            if alias.is_some() || has_token(node, "*") {
                self.items
                    .push(Item::Export(ExportDecl::All { source, alias }));
            }
        }
    }

    /// Export/import names may be identifiers or string literals.
    fn module_export_name(&self, node: Node) -> String {
        if node.kind() == "string" {
            self.string_value(node)
        } else {
            self.text(node).to_string()
        }
    }

    fn lower_class(&self, node: Node, modifiers: Modifiers) -> ClassDecl {
        let heritage = named_children(node)
            .into_iter()
            .find(|c| c.kind() == "class_heritage")
            .and_then(|h| {
                named_children(h)
                    .into_iter()
                    .find(|c| c.kind() == "extends_clause")
            })
            .and_then(|clause| {
                let base = clause.child_by_field_name("value")?;
                let type_args = clause
                    .child_by_field_name("type_arguments")
                    .map(|args| self.lower_type_args(args))
                    .unwrap_or_default();
                Some(Heritage {
                    base: self.lower_expr(base),
                    type_args,
                    span: Span::from_ts_node(&clause),
                })
            });

        let members = node
            .child_by_field_name("body")
            .map(|body| self.lower_class_members(body))
            .unwrap_or_default();

        ClassDecl {
            name: node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string()),
            modifiers,
            is_abstract: node.kind() == "abstract_class_declaration",
            heritage,
            type_params: self.lower_type_params(node),
            members,
            span: Span::from_ts_node(&node),
        }
    }

    fn lower_class_members(&self, body: Node) -> Vec<PropertySignature> {
        let mut members = Vec::new();
        for member in named_children(body) {
            if has_token(member, "static") {
                continue;
            }
            match member.kind() {
                "public_field_definition" => {
                    let Some(name) = member
                        .child_by_field_name("name")
                        .and_then(|n| self.property_name(n))
                    else {
                        continue;
                    };
                    members.push(PropertySignature {
                        name,
                        ty: member
                            .child_by_field_name("type")
                            .map(|t| self.lower_type(t)),
                        optional: has_token(member, "?"),
                        readonly: has_token(member, "readonly"),
                    });
                }
                "method_definition" | "method_signature" | "abstract_method_signature" => {
                    let Some(name) = member
                        .child_by_field_name("name")
                        .and_then(|n| self.property_name(n))
                    else {
                        continue;
                    };
                    if name == "constructor" {
                        continue;
                    }
                    members.push(PropertySignature {
                        name,
                        ty: Some(TypeNode::Unsupported(member.kind().to_string())),
                        optional: false,
                        readonly: false,
                    });
                }
                _ => {}
            }
        }
        members
    }

    fn lower_variables(&mut self, node: Node, modifiers: Modifiers) {
        let kind = var_kind(self, node);
        for declarator in named_children(node)
            .into_iter()
            .filter(|d| d.kind() == "variable_declarator")
        {
            let Some(name) = declarator.child_by_field_name("name") else {
                continue;
            };
            let span = Span::from_ts_node(&declarator);
            if name.kind() == "identifier" {
                let decl = VariableDecl {
                    name: self.text(name).to_string(),
                    kind,
                    type_ann: declarator
                        .child_by_field_name("type")
                        .map(|t| self.lower_type(t)),
                    init: declarator
                        .child_by_field_name("value")
                        .map(|v| self.lower_expr(v)),
                    modifiers,
                    span,
                };
                self.items.push(Item::Variable(decl));
            } else {
                let mut bound = Vec::new();
                match self.declarator_source(declarator) {
                    Some(source) => self.pattern_bindings(name, source, &mut bound),
                    None => self.unsourced(name, &mut bound),
                }
                for (name, init) in bound {
                    self.items.push(Item::Variable(VariableDecl {
                        name,
                        kind,
                        type_ann: None,
                        init,
                        modifiers,
                        span,
                    }));
                }
            }
        }
    }

    fn lower_interface(&self, node: Node, modifiers: Modifiers) -> Option<InterfaceDecl> {
        let name = node.child_by_field_name("name")?;
        let extends = named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "extends_type_clause")
            .flat_map(named_children)
            .map(|t| self.lower_type(t))
            .collect();
        let (members, index) = node
            .child_by_field_name("body")
            .map(|body| self.lower_object_members(body))
            .unwrap_or_default();
        Some(InterfaceDecl {
            name: self.text(name).to_string(),
            type_params: self.lower_type_params(node),
            extends,
            members,
            index: index.map(|b| *b),
            modifiers,
            span: Span::from_ts_node(&node),
        })
    }

    fn lower_type_params(&self, node: Node) -> Vec<TypeParam> {
        let Some(params) = node.child_by_field_name("type_parameters") else {
            return Vec::new();
        };
        named_children(params)
            .into_iter()
            .filter(|p| p.kind() == "type_parameter")
            .filter_map(|p| {
                let name = p.child_by_field_name("name")?;
                let default = p
                    .child_by_field_name("value")
                    .and_then(first_named)
                    .map(|t| self.lower_type(t));
                Some(TypeParam {
                    name: self.text(name).to_string(),
                    default,
                })
            })
            .collect()
    }

    fn lower_type_args(&self, node: Node) -> Vec<TypeNode> {
        named_children(node)
            .into_iter()
            .map(|t| self.lower_type(t))
            .collect()
    }

    // ---- Types -------------------------------------------------------------

    fn lower_type(&self, node: Node) -> TypeNode {
        match node.kind() {
            "type_annotation"
            | "opting_type_annotation"
            | "omitting_type_annotation"
            | "parenthesized_type"
            | "default_type" => match first_named(node) {
                Some(inner) => self.lower_type(inner),
                None => TypeNode::Unsupported(node.kind().to_string()),
            },
            "predefined_type" => Keyword::from_text(self.text(node).trim())
                .map(TypeNode::Keyword)
                .unwrap_or_else(|| TypeNode::Unsupported(self.text(node).to_string())),
            "literal_type" => self.lower_literal_type(node),
            "type_identifier" | "identifier" => TypeNode::Ref {
                name: vec![self.text(node).to_string()],
                args: Vec::new(),
            },
            "nested_type_identifier" => TypeNode::Ref {
                name: dotted_path(self.text(node)),
                args: Vec::new(),
            },
            "generic_type" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| dotted_path(self.text(n)))
                    .unwrap_or_default();
                let args = node
                    .child_by_field_name("type_arguments")
                    .map(|a| self.lower_type_args(a))
                    .unwrap_or_default();
                TypeNode::Ref { name, args }
            }
            "type_query" => match first_named(node) {
                Some(target)
                    if matches!(target.kind(), "identifier" | "member_expression") =>
                {
                    TypeNode::Query(dotted_path(self.text(target)))
                }
                _ => TypeNode::Unsupported("type_query".to_string()),
            },
            "object_type" => {
                let (members, index) = self.lower_object_members(node);
                TypeNode::Object { members, index }
            }
            "union_type" => {
                let mut members = Vec::new();
                self.flatten_type(node, "union_type", &mut members);
                TypeNode::Union(members)
            }
            "intersection_type" => {
                let mut members = Vec::new();
                self.flatten_type(node, "intersection_type", &mut members);
                TypeNode::Intersection(members)
            }
            "array_type" => match first_named(node) {
                Some(element) => TypeNode::Array(Box::new(self.lower_type(element))),
                None => TypeNode::Unsupported("array_type".to_string()),
            },
            "readonly_type" => match first_named(node) {
                Some(inner) => readonly_leading(self.lower_type(inner)),
                None => TypeNode::Unsupported("readonly_type".to_string()),
            },
            "tuple_type" => TypeNode::Tuple(
                named_children(node)
                    .into_iter()
                    .map(|element| match element.kind() {
                        "optional_type" => first_named(element)
                            .map(|t| {
                                TypeNode::Union(vec![
                                    self.lower_type(t),
                                    TypeNode::Keyword(Keyword::Undefined),
                                ])
                            })
                            .unwrap_or_else(|| TypeNode::Unsupported("optional_type".into())),
                        "tuple_parameter" | "optional_tuple_parameter" => element
                            .child_by_field_name("type")
                            .map(|t| self.lower_type(t))
                            .unwrap_or_else(|| TypeNode::Unsupported(element.kind().into())),
                        _ => self.lower_type(element),
                    })
                    .collect(),
            ),
            "lookup_type" => {
                let parts = named_children(node);
                match parts.as_slice() {
                    [object, index] => TypeNode::Indexed {
                        object: Box::new(self.lower_type(*object)),
                        index: Box::new(self.lower_type(*index)),
                    },
                    _ => TypeNode::Unsupported("lookup_type".to_string()),
                }
            }
            "template_literal_type" => TypeNode::Keyword(Keyword::String),
            other => TypeNode::Unsupported(other.to_string()),
        }
    }

    fn lower_literal_type(&self, node: Node) -> TypeNode {
        let Some(inner) = first_named(node) else {
            return TypeNode::Unsupported("literal_type".to_string());
        };
        match inner.kind() {
            "string" => TypeNode::StrLit(self.string_value(inner)),
            "number" => match canonical_number(self.text(inner)) {
                Some(n) => TypeNode::NumLit(n),
                None => TypeNode::Keyword(Keyword::BigInt),
            },
            "true" => TypeNode::BoolLit(true),
            "false" => TypeNode::BoolLit(false),
            "null" => TypeNode::Keyword(Keyword::Null),
            "undefined" => TypeNode::Keyword(Keyword::Undefined),
            "unary_expression" => {
                let negated = inner
                    .child_by_field_name("argument")
                    .filter(|a| a.kind() == "number")
                    .and_then(|a| canonical_number(self.text(a)));
                match (self.operator(inner), negated) {
                    (Some("-"), Some(n)) if n != "0" => TypeNode::NumLit(format!("-{n}")),
                    (Some("-"), Some(n)) => TypeNode::NumLit(n),
                    _ => TypeNode::Unsupported("unary_expression".to_string()),
                }
            }
            other => TypeNode::Unsupported(other.to_string()),
        }
    }

    fn operator(&self, node: Node) -> Option<&'a str> {
        node.child_by_field_name("operator").map(|op| self.text(op))
    }

    fn flatten_type(&self, node: Node, kind: &str, out: &mut Vec<TypeNode>) {
        for child in named_children(node) {
            if child.kind() == kind {
                self.flatten_type(child, kind, out);
            } else {
                out.push(self.lower_type(child));
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn lower_object_members(
        &self,
        body: Node,
    ) -> (Vec<PropertySignature>, Option<Box<TypeNode>>) {
        let mut members = Vec::new();
        let mut index = None;
        for member in named_children(body) {
            match member.kind() {
                "property_signature" => {
                    let Some(name) = member
                        .child_by_field_name("name")
                        .and_then(|n| self.property_name(n))
                    else {
                        continue;
                    };
                    members.push(PropertySignature {
                        name,
                        ty: member
                            .child_by_field_name("type")
                            .map(|t| self.lower_type(t)),
                        optional: has_token(member, "?"),
                        readonly: has_token(member, "readonly"),
                    });
                }
                "method_signature" => {
                    if let Some(name) = member
                        .child_by_field_name("name")
                        .and_then(|n| self.property_name(n))
                    {
                        members.push(PropertySignature {
                            name,
                            ty: Some(TypeNode::Unsupported("method_signature".to_string())),
                            optional: has_token(member, "?"),
                            readonly: false,
                        });
                    }
                }
                "index_signature" => {
                    index = Some(Box::new(
                        member
                            .child_by_field_name("type")
                            .map(|t| self.lower_type(t))
                            .unwrap_or_else(|| TypeNode::Unsupported("index_signature".into())),
                    ));
                }
                _ => {}
            }
        }
        (members, index)
    }

    // ---- Expressions -------------------------------------------------------

    fn lower_expr(&self, node: Node) -> Expr {
        match node.kind() {
            "parenthesized_expression" => match first_named(node) {
                Some(inner) if inner.kind() != "sequence_expression" => self.lower_expr(inner),
                _ => Expr::Other("parenthesized_expression".to_string()),
            },
            "identifier" | "undefined" => Expr::Ident(self.text(node).to_string()),
            "this" => Expr::This,
            "member_expression" => {
                let (Some(object), Some(property)) = (
                    node.child_by_field_name("object"),
                    node.child_by_field_name("property"),
                ) else {
                    return Expr::Other("member_expression".to_string());
                };
                Expr::Member {
                    object: Box::new(self.lower_expr(object)),
                    property: self.text(property).to_string(),
                }
            }
            "subscript_expression" => {
                let (Some(object), Some(index)) = (
                    node.child_by_field_name("object"),
                    node.child_by_field_name("index"),
                ) else {
                    return Expr::Other("subscript_expression".to_string());
                };
                Expr::Index {
                    object: Box::new(self.lower_expr(object)),
                    index: Box::new(self.lower_expr(index)),
                }
            }
            "string" => Expr::Str(self.string_value(node)),
            "template_string" => {
                if named_children(node)
                    .iter()
                    .any(|c| c.kind() == "template_substitution")
                {
                    Expr::Template
                } else {
                    let raw = self.text(node);
                    Expr::Str(unescape(raw.trim_start_matches('`').trim_end_matches('`')))
                }
            }
            "number" => match canonical_number(self.text(node)) {
                Some(n) => Expr::Number(n),
                None => Expr::Other("bigint".to_string()),
            },
            "true" => Expr::Bool(true),
            "false" => Expr::Bool(false),
            "null" => Expr::Null,
            "object" => Expr::Object(
                named_children(node)
                    .into_iter()
                    .filter_map(|m| self.lower_object_member(m))
                    .collect(),
            ),
            "array" => Expr::Array(
                named_children(node)
                    .into_iter()
                    .map(|e| self.lower_expr(e))
                    .collect(),
            ),
            "new_expression" => {
                let Some(constructor) = node.child_by_field_name("constructor") else {
                    return Expr::Other("new_expression".to_string());
                };
                Expr::New(NewExpr {
                    callee: Box::new(self.lower_expr(constructor)),
                    callee_text: self.text(constructor).to_string(),
                    args: node
                        .child_by_field_name("arguments")
                        .map(|args| self.lower_args(args)),
                })
            }
            "call_expression" => {
                let Some(function) = node.child_by_field_name("function") else {
                    return Expr::Other("call_expression".to_string());
                };
                Expr::Call {
                    callee: Box::new(self.lower_expr(function)),
                    args: node
                        .child_by_field_name("arguments")
                        .map(|args| self.lower_args(args))
                        .unwrap_or_default(),
                }
            }
            "as_expression" => {
                let parts = named_children(node);
                match parts.as_slice() {
                    [expr] => Expr::AsConst(Box::new(self.lower_expr(*expr))),
                    [expr, ty] => Expr::As {
                        expr: Box::new(self.lower_expr(*expr)),
                        ty: Box::new(self.lower_type(*ty)),
                    },
                    _ => Expr::Other("as_expression".to_string()),
                }
            }
            "satisfies_expression" => {
                let parts = named_children(node);
                match parts.as_slice() {
                    [expr, ty] => Expr::Satisfies {
                        expr: Box::new(self.lower_expr(*expr)),
                        ty: Box::new(self.lower_type(*ty)),
                    },
                    _ => Expr::Other("satisfies_expression".to_string()),
                }
            }
            "type_assertion" => {
                let parts = named_children(node);
                match parts.as_slice() {
                    [args, expr] if args.kind() == "type_arguments" => {
                        match first_named(*args) {
                            Some(ty) if self.text(ty) == "const" => {
                                Expr::AsConst(Box::new(self.lower_expr(*expr)))
                            }
                            Some(ty) => Expr::As {
                                expr: Box::new(self.lower_expr(*expr)),
                                ty: Box::new(self.lower_type(ty)),
                            },
                            None => self.lower_expr(*expr),
                        }
                    }
                    _ => Expr::Other("type_assertion".to_string()),
                }
            }
            "non_null_expression" => match first_named(node) {
                Some(inner) => Expr::NonNull(Box::new(self.lower_expr(inner))),
                None => Expr::Other("non_null_expression".to_string()),
            },
            "spread_element" => match first_named(node) {
                Some(inner) => Expr::Spread(Box::new(self.lower_expr(inner))),
                None => Expr::Other("spread_element".to_string()),
            },
            "ternary_expression" => {
                let (Some(consequent), Some(alternate)) = (
                    node.child_by_field_name("consequence"),
                    node.child_by_field_name("alternative"),
                ) else {
                    return Expr::Other("ternary_expression".to_string());
                };
                Expr::Conditional {
                    consequent: Box::new(self.lower_expr(consequent)),
                    alternate: Box::new(self.lower_expr(alternate)),
                }
            }
            "binary_expression" => {
                let op = match node.child_by_field_name("operator").map(|o| o.kind()) {
                    Some("&&") => LogicalOp::And,
                    Some("||") => LogicalOp::Or,
                    Some("??") => LogicalOp::Nullish,
                    _ => return Expr::Other("binary_expression".to_string()),
                };
                let (Some(left), Some(right)) = (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("right"),
                ) else {
                    return Expr::Other("binary_expression".to_string());
                };
                Expr::Logical {
                    op,
                    left: Box::new(self.lower_expr(left)),
                    right: Box::new(self.lower_expr(right)),
                }
            }
            "arrow_function" | "function_expression" | "function" | "generator_function" => {
                Expr::Function
            }
            other => Expr::Other(other.to_string()),
        }
    }

    fn lower_args(&self, node: Node) -> Vec<Expr> {
        named_children(node)
            .into_iter()
            .map(|a| self.lower_expr(a))
            .collect()
    }

    fn lower_object_member(&self, node: Node) -> Option<ObjectMember> {
        match node.kind() {
            "pair" => {
                let key = node.child_by_field_name("key")?;
                let value = node.child_by_field_name("value")?;
                Some(match self.property_name(key) {
                    Some(key) => ObjectMember::Property {
                        key,
                        value: self.lower_expr(value),
                    },
                    None => ObjectMember::Computed,
                })
            }
            "shorthand_property_identifier" => {
                Some(ObjectMember::Shorthand(self.text(node).to_string()))
            }
            "spread_element" => {
                first_named(node).map(|inner| ObjectMember::Spread(self.lower_expr(inner)))
            }
            "method_definition" => Some(
                node.child_by_field_name("name")
                    .and_then(|n| self.property_name(n))
                    .map(ObjectMember::Method)
                    .unwrap_or(ObjectMember::Computed),
            ),
            _ => None,
        }
    }

    /// Statically known property name, or `None` for computed keys.
    fn property_name(&self, node: Node) -> Option<String> {
        match node.kind() {
            "property_identifier"
            | "identifier"
            | "private_property_identifier"
            | "type_identifier" => Some(self.text(node).to_string()),
            "string" => Some(self.string_value(node)),
            "number" => canonical_number(self.text(node)),
            _ => None,
        }
    }

    fn string_value(&self, node: Node) -> String {
        let mut out = String::new();
        for child in named_children(node) {
            match child.kind() {
                "string_fragment" => out.push_str(self.text(child)),
                "escape_sequence" => out.push_str(&unescape(self.text(child))),
                _ => {}
            }
        }
        out
    }

    fn pattern_names(&self, node: Node, out: &mut Vec<String>) {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                out.push(self.text(node).to_string())
            }
            "pair_pattern" => {
                if let Some(value) = node.child_by_field_name("value") {
                    self.pattern_names(value, out);
                }
            }
            "assignment_pattern" | "object_assignment_pattern" => {
                if let Some(left) = node.child_by_field_name("left") {
                    self.pattern_names(left, out);
                }
            }
            _ => {
                for child in named_children(node) {
                    self.pattern_names(child, out);
                }
            }
        }
    }

    /// The expression a destructuring declarator reads from: its initializer,
    /// or its annotation when there is one.
    fn declarator_source(&self, declarator: Node) -> Option<Expr> {
        if let Some(ty) = declarator.child_by_field_name("type") {
            return Some(Expr::As {
                expr: Box::new(Expr::Other("pattern".to_string())),
                ty: Box::new(self.lower_type(ty)),
            });
        }
        declarator
            .child_by_field_name("value")
            .map(|v| self.lower_expr(v))
    }

    /// Names bound by a destructuring pattern, each with an expression
    /// reading its value out of `source`.
    fn pattern_bindings(&self, node: Node, source: Expr, out: &mut Vec<(String, Option<Expr>)>) {
        match node.kind() {
            "identifier" => out.push((self.text(node).to_string(), Some(source))),
            "assignment_pattern" => {
                let (Some(left), Some(right)) = (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("right"),
                ) else {
                    return self.unsourced(node, out);
                };
                self.pattern_bindings(left, with_default(source, self.lower_expr(right)), out);
            }
            "object_pattern" => {
                for member in named_children(node) {
                    self.object_pattern_member(member, &source, out);
                }
            }
            "array_pattern" => {
                let mut position = 0usize;
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    if !child.is_named() {
                        if child.kind() == "," {
                            position += 1;
                        }
                        continue;
                    }
                    match child.kind() {
                        "comment" => {}
                        "rest_pattern" => self.unsourced(child, out),
                        _ => {
                            let element = Expr::Index {
                                object: Box::new(source.clone()),
                                index: Box::new(Expr::Number(position.to_string())),
                            };
                            self.pattern_bindings(child, element, out);
                        }
                    }
                }
            }
            _ => self.unsourced(node, out),
        }
    }

    fn object_pattern_member(
        &self,
        member: Node,
        source: &Expr,
        out: &mut Vec<(String, Option<Expr>)>,
    ) {
        let read = |property: String| Expr::Member {
            object: Box::new(source.clone()),
            property,
        };
        match member.kind() {
            "shorthand_property_identifier_pattern" => {
                let name = self.text(member).to_string();
                out.push((name.clone(), Some(read(name))));
            }
            "pair_pattern" => {
                let Some(value) = member.child_by_field_name("value") else {
                    return;
                };
                match member
                    .child_by_field_name("key")
                    .and_then(|k| self.property_name(k))
                {
                    Some(key) => self.pattern_bindings(value, read(key), out),
                    None => self.unsourced(value, out),
                }
            }
            "object_assignment_pattern" => {
                let (Some(left), Some(right)) = (
                    member.child_by_field_name("left"),
                    member.child_by_field_name("right"),
                ) else {
                    return self.unsourced(member, out);
                };
                if left.kind() == "shorthand_property_identifier_pattern" {
                    let name = self.text(left).to_string();
                    let value = with_default(read(name.clone()), self.lower_expr(right));
                    out.push((name, Some(value)));
                } else {
                    self.unsourced(left, out);
                }
            }
            _ => self.unsourced(member, out),
        }
    }

    /// Names bound by `node` whose types are not tracked.
    fn unsourced(&self, node: Node, out: &mut Vec<(String, Option<Expr>)>) {
        let mut names = Vec::new();
        self.pattern_names(node, &mut names);
        out.extend(names.into_iter().map(|name| (name, None)));
    }

    // ---- Throw sites and local scopes -------------------------------------

    fn walk(&mut self, node: Node) {
        if node.is_error() {
            return;
        }
        match node.kind() {
            "throw_statement" => {
                if let Some(thrown) = first_named(node) {
                    let site = ThrowSite {
                        expr: self.lower_expr(thrown),
                        span: Span::from_ts_node(&node),
                        owner: self.owner,
                        scope: self.scope.clone(),
                    };
                    self.throws.push(site);
                }
                self.walk_children(node);
            }
            "lexical_declaration" | "variable_declaration" => {
                let kind = var_kind(self, node);
                for declarator in named_children(node) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    if let Some(value) = declarator.child_by_field_name("value") {
                        self.walk(value);
                    }
                    if self.depth > 0 {
                        self.bind_declarator(declarator, kind);
                    }
                }
            }
            "function_declaration" | "generator_function_declaration" => {
                if self.depth > 0 {
                    if let Some(name) = node.child_by_field_name("name") {
                        self.bind(self.text(name).to_string(), BindingKind::Function, None, None);
                    }
                }
                self.walk_function(node);
            }
            "class_declaration" | "abstract_class_declaration" => {
                if self.depth > 0 {
                    if let Some(name) = node.child_by_field_name("name") {
                        self.bind(self.text(name).to_string(), BindingKind::Class, None, None);
                    }
                }
                self.walk_children(node);
            }
            "arrow_function" | "function_expression" | "function" | "generator_function"
            | "method_definition" => self.walk_function(node),
            "catch_clause" => self.scoped(|this| {
                if let Some(param) = node.child_by_field_name("parameter") {
                    let mut names = Vec::new();
                    this.pattern_names(param, &mut names);
                    let type_ann = node
                        .child_by_field_name("type")
                        .map(|t| this.lower_type(t));
                    for name in names {
                        this.bind(name, BindingKind::Catch, type_ann.clone(), None);
                    }
                }
                if let Some(body) = node.child_by_field_name("body") {
                    this.walk(body);
                }
            }),
            "for_in_statement" => self.scoped(|this| {
                if let Some(left) = node.child_by_field_name("left") {
                    let mut names = Vec::new();
                    this.pattern_names(left, &mut names);
                    for name in names {
                        this.bind(name, BindingKind::Let, None, None);
                    }
                }
                this.walk_children(node);
            }),
            "statement_block" | "class_body" | "for_statement" | "switch_body" => {
                self.scoped(|this| this.walk_children(node))
            }
            _ => self.walk_children(node),
        }
    }

    fn walk_children(&mut self, node: Node) {
        for child in named_children(node) {
            self.walk(child);
        }
    }

    fn walk_function(&mut self, node: Node) {
        self.scoped(|this| {
            if let Some(params) = node.child_by_field_name("parameters") {
                for param in named_children(params) {
                    this.bind_parameter(param);
                }
            } else if let Some(param) = node.child_by_field_name("parameter") {
                this.bind(this.text(param).to_string(), BindingKind::Param, None, None);
            }
            if let Some(body) = node.child_by_field_name("body") {
                this.walk(body);
            }
        });
    }

    fn bind_parameter(&mut self, param: Node) {
        if !matches!(param.kind(), "required_parameter" | "optional_parameter") {
            return;
        }
        let Some(pattern) = param.child_by_field_name("pattern") else {
            return;
        };
        if pattern.kind() == "identifier" {
            let type_ann = param
                .child_by_field_name("type")
                .map(|t| self.lower_type(t));
            let init = param
                .child_by_field_name("value")
                .map(|v| self.lower_expr(v));
            self.bind(
                self.text(pattern).to_string(),
                BindingKind::Param,
                type_ann,
                init,
            );
        } else {
            let mut bound = Vec::new();
            match self.declarator_source(param) {
                Some(source) => self.pattern_bindings(pattern, source, &mut bound),
                None => self.unsourced(pattern, &mut bound),
            }
            for (name, init) in bound {
                self.bind(name, BindingKind::Param, None, init);
            }
        }
    }

    fn bind_declarator(&mut self, declarator: Node, kind: VarKind) {
        let Some(name) = declarator.child_by_field_name("name") else {
            return;
        };
        let binding_kind = match kind {
            VarKind::Const => BindingKind::Const,
            VarKind::Let => BindingKind::Let,
            VarKind::Var => BindingKind::Var,
        };
        if name.kind() == "identifier" {
            let type_ann = declarator
                .child_by_field_name("type")
                .map(|t| self.lower_type(t));
            let init = declarator
                .child_by_field_name("value")
                .map(|v| self.lower_expr(v));
            self.bind(self.text(name).to_string(), binding_kind, type_ann, init);
        } else {
            let mut bound = Vec::new();
            match self.declarator_source(declarator) {
                Some(source) => self.pattern_bindings(name, source, &mut bound),
                None => self.unsourced(name, &mut bound),
            }
            for (name, init) in bound {
                self.bind(name, binding_kind, None, init);
            }
        }
    }

    fn bind(
        &mut self,
        name: String,
        kind: BindingKind,
        type_ann: Option<TypeNode>,
        init: Option<Expr>,
    ) {
        self.scope.push(Arc::new(Binding {
            name,
            kind,
            type_ann,
            init,
        }));
    }

    fn scoped(&mut self, f: impl FnOnce(&mut Self)) {
        let saved = self.scope.len();
        self.depth += 1;
        f(self);
        self.depth -= 1;
        self.scope.truncate(saved);
    }
}

fn var_kind(lowerer: &Lowerer, node: Node) -> VarKind {
    if node.kind() == "variable_declaration" {
        return VarKind::Var;
    }
    match node.child_by_field_name("kind").map(|k| lowerer.text(k)) {
        Some("let") => VarKind::Let,
        _ => VarKind::Const,
    }
}

/// Named children, comments excluded.
/// A destructured value with a default: `undefined` falls back to it.
fn with_default(value: Expr, default: Expr) -> Expr {
    Expr::Logical {
        op: LogicalOp::Nullish,
        left: Box::new(value),
        right: Box::new(default),
    }
}

/// `readonly` binds to the operand before any `|` or `&`, but the grammar
/// wraps the whole union.
fn readonly_leading(ty: TypeNode) -> TypeNode {
    match ty {
        TypeNode::Union(mut members) if !members.is_empty() => {
            let first = members.remove(0);
            members.insert(0, readonly_leading(first));
            TypeNode::Union(members)
        }
        TypeNode::Intersection(mut members) if !members.is_empty() => {
            let first = members.remove(0);
            members.insert(0, readonly_leading(first));
            TypeNode::Intersection(members)
        }
        other => TypeNode::Readonly(Box::new(other)),
    }
}

fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

fn first_named(node: Node) -> Option<Node> {
    named_children(node).into_iter().next()
}

/// True when `node` has an anonymous child token of the given kind.
fn has_token(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| !c.is_named() && c.kind() == kind);
    found
}

fn dotted_path(text: &str) -> Vec<String> {
    text.split('.')
        .map(|part| part.trim().trim_start_matches('?').to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Canonical decimal text of a numeric literal; `None` for bigint literals
/// and text that is not a number.
pub(crate) fn canonical_number(text: &str) -> Option<String> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    let radix = match lower.get(..2) {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    if lower.ends_with('n') && radix != Some(16) {
        return None;
    }
    if let Some(radix) = radix {
        return u128::from_str_radix(&lower[2..], radix)
            .ok()
            .map(|v| v.to_string());
    }
    let value: f64 = lower.parse().ok()?;
    Some(format!("{value}"))
}

/// Decode JavaScript string escapes.
pub(crate) fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('\n') => {}
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(ch);
                }
            }
            Some('u') => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|c| *c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(ch);
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
