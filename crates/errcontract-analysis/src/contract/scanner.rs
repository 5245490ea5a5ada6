//! Throw-site scanning.
//!
//! Every `throw new X(...)` in a file with endpoints is checked in order:
//! constructor name, presence of an argument, presence of `id` on the
//! argument type, and assignability of `id` into the permitted union. The
//! first failing check produces the file's diagnostic for that site.

use std::sync::Arc;

use errcontract_core::config::ScopeMode;

use super::classifier::EndpointDecl;
use super::diagnostics::Diagnostic;
use super::metadata::ErrorIdSet;
use crate::context::AnalysisContext;
use crate::project::FileId;
use crate::syntax::ast::{Expr, NewExpr, ThrowSite};

/// An endpoint with its resolved identifier set.
pub type ResolvedEndpoint = (EndpointDecl, Arc<ErrorIdSet>);

/// Scan the throw sites of `file` against its endpoints. Files without
/// endpoints produce nothing.
pub fn scan_file(
    ctx: &AnalysisContext,
    file: FileId,
    endpoints: &[ResolvedEndpoint],
) -> Vec<Diagnostic> {
    let Some(fallback) = fallback_set(ctx.config().analysis.effective_scope(), endpoints) else {
        return Vec::new();
    };
    let source = ctx.project().file(file);
    let mut diagnostics = Vec::new();

    for site in &source.throws {
        let Expr::New(new) = &site.expr else {
            continue;
        };
        let permitted = match ctx.config().analysis.effective_scope() {
            ScopeMode::Class => site
                .owner
                .and_then(|owner| endpoints.iter().find(|(e, _)| e.item == owner))
                .map(|(_, ids)| ids.as_ref())
                .unwrap_or(&fallback),
            ScopeMode::File => &fallback,
        };
        if let Some(diagnostic) = check_throw(ctx, file, site, new, permitted) {
            diagnostics.push(diagnostic);
        }
    }
    diagnostics
}

/// Set used for throws outside every endpoint body (and for all throws in
/// file mode).
fn fallback_set(scope: ScopeMode, endpoints: &[ResolvedEndpoint]) -> Option<ErrorIdSet> {
    match scope {
        ScopeMode::File => endpoints.last().map(|(_, ids)| ids.as_ref().clone()),
        ScopeMode::Class => {
            let (first, rest) = endpoints.split_first()?;
            Some(
                rest.iter()
                    .fold(first.1.as_ref().clone(), |acc, (_, ids)| acc.intersection(ids)),
            )
        }
    }
}

/// Apply the check ladder to one `throw new` site.
pub fn check_throw(
    ctx: &AnalysisContext,
    file: FileId,
    site: &ThrowSite,
    new: &NewExpr,
    permitted: &ErrorIdSet,
) -> Option<Diagnostic> {
    let path = ctx.project().file(file).path.clone();
    let sanctioned = ctx.sanctioned_class();
    tracing::debug!(thrown = %new.callee_text, line = site.span.start_line, "throw site");

    if new.callee_text != sanctioned {
        return Some(Diagnostic::wrong_error_class(
            path,
            site.span,
            &new.callee_text,
            sanctioned,
        ));
    }

    let Some(argument) = new.args.as_ref().and_then(|args| args.first()) else {
        return Some(Diagnostic::missing_argument(path, site.span));
    };

    let checker = ctx.checker();
    let argument_type = checker.type_of_expr(file, argument, &site.scope);
    let Some(id) = checker.property_of(&argument_type, "id") else {
        return Some(Diagnostic::argument_not_object(path, site.span));
    };

    let union = permitted.permitted_union();
    let assignable = checker.is_assignable(&id, &union);
    tracing::debug!(id = %id, permitted = %union, assignable, "id assignability");
    if !assignable {
        return Some(Diagnostic::undeclared_error_id(path, site.span));
    }
    None
}
