//! Project loading errors: build configuration and source enumeration.

use std::path::PathBuf;

use super::error_code::{self, ErrorCode};

/// Errors raised while locating and loading the analyzed program.
/// Every variant is fatal: a project that cannot be loaded is never analyzed.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Project root does not exist: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Build configuration not found: {path}")]
    TsConfigNotFound { path: PathBuf },

    #[error("Invalid build configuration {path}: {message}")]
    TsConfigInvalid { path: PathBuf, message: String },

    #[error("Circular `extends` chain through {path}")]
    TsConfigCycle { path: PathBuf },

    #[error("Invalid file pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No source files matched the build configuration at {path}")]
    NoSourceFiles { path: PathBuf },
}

impl ErrorCode for ProjectError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::TsConfigInvalid { .. } | Self::TsConfigCycle { .. } => {
                error_code::TSCONFIG_ERROR
            }
            _ => error_code::PROJECT_LOAD_ERROR,
        }
    }
}
