//! Contract violations found at throw sites.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::syntax::ast::Span;

/// Which rung of the throw-site check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Something other than the sanctioned error class is constructed.
    WrongErrorClass,
    MissingArgument,
    /// The first argument has no `id` member.
    ArgumentNotObject,
    /// `id` is not one of the endpoint's declared identifiers.
    UndeclaredErrorId,
}

impl DiagnosticKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::WrongErrorClass => "wrong_error_class",
            Self::MissingArgument => "missing_argument",
            Self::ArgumentNotObject => "argument_not_object",
            Self::UndeclaredErrorId => "undeclared_error_id",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One violation at one throw statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub source_path: PathBuf,
    pub start_line: u32,
    pub end_line: u32,
    pub start_offset: usize,
    pub end_offset: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(source_path: PathBuf, span: Span, kind: DiagnosticKind, message: String) -> Self {
        Self {
            source_path,
            start_line: span.start_line,
            end_line: span.end_line,
            start_offset: span.start_offset,
            end_offset: span.end_offset,
            kind,
            message,
        }
    }

    pub fn wrong_error_class(source_path: PathBuf, span: Span, name: &str, sanctioned: &str) -> Self {
        Self::new(
            source_path,
            span,
            DiagnosticKind::WrongErrorClass,
            format!("instance of {name} is thrown instead of {sanctioned}"),
        )
    }

    pub fn missing_argument(source_path: PathBuf, span: Span) -> Self {
        Self::new(
            source_path,
            span,
            DiagnosticKind::MissingArgument,
            "invalid constructor argument: arguments are not supplied from call site".to_string(),
        )
    }

    pub fn argument_not_object(source_path: PathBuf, span: Span) -> Self {
        Self::new(
            source_path,
            span,
            DiagnosticKind::ArgumentNotObject,
            "invalid constructor argument: the first argument is not an object".to_string(),
        )
    }

    pub fn undeclared_error_id(source_path: PathBuf, span: Span) -> Self {
        Self::new(
            source_path,
            span,
            DiagnosticKind::UndeclaredErrorId,
            "invalid constructor argument: type of id is not declared in `meta.errors` section. consider add it."
                .to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span {
            start_line: 3,
            end_line: 4,
            start_offset: 40,
            end_offset: 90,
        }
    }

    #[test]
    fn test_messages() {
        let d = Diagnostic::wrong_error_class("a.ts".into(), span(), "Error", "ApiError");
        assert_eq!(d.message, "instance of Error is thrown instead of ApiError");
        assert_eq!(d.start_line, 3);
        assert_eq!(d.end_offset, 90);
        let d = Diagnostic::undeclared_error_id("a.ts".into(), span());
        assert!(d.message.contains("`meta.errors`"));
    }

    #[test]
    fn test_kind_serializes_as_code() {
        for kind in [
            DiagnosticKind::WrongErrorClass,
            DiagnosticKind::MissingArgument,
            DiagnosticKind::ArgumentNotObject,
            DiagnosticKind::UndeclaredErrorId,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.code()));
        }
    }
}
