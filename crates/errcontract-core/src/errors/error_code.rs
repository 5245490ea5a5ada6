//! ErrorCode trait: stable machine-readable codes for every error enum.

/// Every error enum implements this to expose a structured code string,
/// used by the JSON reporter and by the CLI when it aborts.
pub trait ErrorCode {
    /// Returns the error code string (e.g., "CONFIG_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const PROJECT_LOAD_ERROR: &str = "PROJECT_LOAD_ERROR";
pub const TSCONFIG_ERROR: &str = "TSCONFIG_ERROR";
pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const GRAMMAR_ERROR: &str = "GRAMMAR_ERROR";
pub const AMBIGUOUS_BASE_SYMBOL: &str = "AMBIGUOUS_BASE_SYMBOL";
pub const UNKNOWN_FILE: &str = "UNKNOWN_FILE";
