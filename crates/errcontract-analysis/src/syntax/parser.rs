//! TypeScript parser: tree-sitter-typescript front end that produces the
//! lowered [`SourceFile`] model.

use std::path::Path;
use std::time::Instant;

use errcontract_core::errors::ParseError;
use tree_sitter::{Parser, Tree};

use super::ast::SourceFile;
use super::error_tolerant::count_errors;
use super::lower::lower_program;
use crate::project::source_kind::SourceKind;

/// Owns one tree-sitter parser per grammar (TypeScript and TSX).
pub struct TsParser {
    typescript: Parser,
    tsx: Parser,
}

impl TsParser {
    pub fn new() -> Result<Self, ParseError> {
        let mut typescript = Parser::new();
        typescript
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .map_err(|e| ParseError::GrammarUnavailable {
                message: e.to_string(),
            })?;

        let mut tsx = Parser::new();
        tsx.set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())
            .map_err(|e| ParseError::GrammarUnavailable {
                message: e.to_string(),
            })?;

        Ok(Self { typescript, tsx })
    }

    /// Parse `source` into a raw tree, picking the grammar from the extension.
    pub fn parse_tree(&mut self, source: &str, path: &Path) -> Result<Tree, ParseError> {
        let parser = match SourceKind::from_path(path) {
            Some(SourceKind::Tsx) => &mut self.tsx,
            _ => &mut self.typescript,
        };
        parser.parse(source, None).ok_or_else(|| ParseError::NoTree {
            path: path.to_path_buf(),
        })
    }

    /// Parse and lower one file.
    pub fn parse(&mut self, source: &str, path: &Path) -> Result<SourceFile, ParseError> {
        let start = Instant::now();
        let tree = self.parse_tree(source, path)?;
        let root = tree.root_node();

        let (parse_errors, _) = count_errors(root);
        if parse_errors > 0 {
            tracing::warn!(
                path = %path.display(),
                errors = parse_errors,
                "file parsed with errors; analyzing recovered tree"
            );
        }

        let (items, throws) = lower_program(root, source.as_bytes());
        let file = SourceFile {
            path: path.to_path_buf(),
            is_declaration_file: SourceKind::from_path(path)
                .is_some_and(|kind| kind.is_declaration()),
            items,
            throws,
            parse_errors,
        };

        tracing::trace!(
            path = %path.display(),
            items = file.items.len(),
            throws = file.throws.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "parsed"
        );
        Ok(file)
    }
}
