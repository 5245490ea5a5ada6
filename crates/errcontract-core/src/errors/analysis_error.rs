//! Top-level fatal error for an analysis run.

use super::error_code::ErrorCode;
use super::{ConfigError, ParseError, ProjectError, ResolveError};

/// Errors that abort an analysis run.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Project error: {0}")]
    Project(#[from] ProjectError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),
}

impl ErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Project(e) => e.error_code(),
            Self::Parse(e) => e.error_code(),
            Self::Resolve(e) => e.error_code(),
        }
    }
}
