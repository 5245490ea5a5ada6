//! Parser errors.

use std::path::PathBuf;

use super::error_code::{self, ErrorCode};

/// Errors that can occur while parsing a source file.
///
/// Syntax errors inside a file are not reported here: tree-sitter recovers
/// and the lowering skips ERROR subtrees. Only failures to produce a tree at
/// all are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to load TypeScript grammar: {message}")]
    GrammarUnavailable { message: String },

    #[error("Tree-sitter produced no tree for {path}")]
    NoTree { path: PathBuf },

    #[error("Source is not valid UTF-8: {path}")]
    InvalidUtf8 { path: PathBuf },
}

impl ErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::GrammarUnavailable { .. } => error_code::GRAMMAR_ERROR,
            _ => error_code::PARSE_ERROR,
        }
    }
}
