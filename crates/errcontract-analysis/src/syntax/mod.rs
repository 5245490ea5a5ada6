//! Syntax layer: tree-sitter parsing and lowering into closed enums.

pub mod ast;
pub mod error_tolerant;
pub mod lower;
pub mod parser;

pub use ast::{SourceFile, Span};
pub use parser::TsParser;
