//! Symbol resolution errors that invalidate the whole run.

use std::path::PathBuf;

use super::error_code::{self, ErrorCode};

/// Resolution failures that violate the assumptions the contract check relies
/// on. These are environment failures, not lint findings.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(
        "base class `{name}` of `{class}` in {file}:{line} resolves to {count} declarations, expected exactly one"
    )]
    AmbiguousBase {
        file: PathBuf,
        line: u32,
        class: String,
        name: String,
        count: usize,
    },

    #[error("File is not part of the loaded program: {path}")]
    UnknownFile { path: PathBuf },
}

impl ErrorCode for ResolveError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AmbiguousBase { .. } => error_code::AMBIGUOUS_BASE_SYMBOL,
            Self::UnknownFile { .. } => error_code::UNKNOWN_FILE,
        }
    }
}
