//! Endpoint classification.
//!
//! An endpoint is a top-level class that is exported, concrete, and not
//! ambient, whose base class is a plain identifier resolving to exactly one
//! value declaration inside the endpoint base file. A base identifier that
//! resolves to zero or several declarations aborts the run.

use errcontract_core::errors::ResolveError;

use crate::checker::{DeclRef, Symbol};
use crate::context::AnalysisContext;
use crate::project::FileId;
use crate::syntax::ast::{ClassDecl, ExportDecl, Expr, Item, SourceFile, Span, TypeNode};

/// An eligible endpoint declaration.
#[derive(Debug, Clone)]
pub struct EndpointDecl {
    pub file: FileId,
    /// Item index of the class in its file.
    pub item: usize,
    /// Class name, `default` for an anonymous default export.
    pub name: String,
    /// Base class identifier as written.
    pub base: String,
    /// First type argument of the base class: the metadata descriptor.
    pub descriptor: Option<TypeNode>,
    pub span: Span,
}

impl EndpointDecl {
    pub fn decl(&self) -> DeclRef {
        DeclRef {
            file: self.file,
            item: self.item,
        }
    }
}

/// Classify every top-level class of `file`, in source order.
pub fn classify_file(
    ctx: &AnalysisContext,
    file: FileId,
) -> Result<Vec<EndpointDecl>, ResolveError> {
    let source = ctx.project().file(file);
    let mut endpoints = Vec::new();
    for (item, class) in source.classes() {
        if let Some(endpoint) = classify_class(ctx, file, source, item, class)? {
            endpoints.push(endpoint);
        }
    }
    Ok(endpoints)
}

fn classify_class(
    ctx: &AnalysisContext,
    file: FileId,
    source: &SourceFile,
    item: usize,
    class: &ClassDecl,
) -> Result<Option<EndpointDecl>, ResolveError> {
    let name = class.display_name();
    if !is_exported(source, class) || class.is_abstract {
        return Ok(None);
    }
    if class.modifiers.ambient || source.is_declaration_file {
        tracing::trace!(class = name, "ambient class skipped");
        return Ok(None);
    }
    let Some(heritage) = &class.heritage else {
        return Ok(None);
    };
    let Expr::Ident(base) = &heritage.base else {
        tracing::trace!(class = name, "base is not a plain identifier");
        return Ok(None);
    };

    let definitions = ctx.checker().resolver().value_definitions(file, base);
    if definitions.len() != 1 {
        return Err(ResolveError::AmbiguousBase {
            file: source.path.clone(),
            line: heritage.span.start_line,
            class: name.to_string(),
            name: base.clone(),
            count: definitions.len(),
        });
    }

    let in_base_file = match &definitions[0] {
        Symbol::Decl(decl) => Some(decl.file) == ctx.endpoint_base_file(),
        _ => false,
    };
    if !in_base_file {
        tracing::trace!(class = name, base = %base, "base not declared in the endpoint base file");
        return Ok(None);
    }

    tracing::debug!(
        file = %source.path.display(),
        class = name,
        base = %base,
        has_descriptor = !heritage.type_args.is_empty(),
        "endpoint classified"
    );
    Ok(Some(EndpointDecl {
        file,
        item,
        name: name.to_string(),
        base: base.clone(),
        descriptor: heritage.type_args.first().cloned(),
        span: class.span,
    }))
}

/// Exported by modifier, or by a later `export { Name }` /
/// `export default Name` in the same file.
fn is_exported(source: &SourceFile, class: &ClassDecl) -> bool {
    if class.modifiers.exported || class.modifiers.default_export {
        return true;
    }
    let Some(name) = class.name.as_deref() else {
        return false;
    };
    source.items.iter().any(|item| match item {
        Item::Export(ExportDecl::Named {
            specifiers,
            source: None,
        }) => specifiers.iter().any(|s| s.local == name),
        Item::Export(ExportDecl::DefaultExpr {
            expr: Expr::Ident(local),
        }) => local == name,
        _ => false,
    })
}
