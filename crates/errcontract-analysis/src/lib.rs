//! errcontract-analysis: checks that every error thrown by an API endpoint
//! carries an identifier the endpoint declares in its metadata.
//!
//! Pipeline: [`project`] loads and parses the program, [`checker`] answers
//! type queries over it, and [`contract`] classifies endpoints, resolves
//! their permitted identifiers and scans throw sites. [`reporters`] formats
//! the result.

pub mod checker;
pub mod context;
pub mod contract;
pub mod project;
pub mod reporters;
pub mod syntax;

pub use context::AnalysisContext;
pub use contract::{analyze, run, AnalysisReport, Diagnostic, DiagnosticKind};
