//! Analysis configuration: the sanctioned error class and identifier scoping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default name of the only error class endpoints may throw.
pub const DEFAULT_ERROR_CLASS: &str = "ApiError";

/// Which permitted-identifier set a throw site is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    /// Throws inside an endpoint's class body use that endpoint's set; throws
    /// elsewhere in the file use the intersection of the file's sets.
    #[default]
    Class,
    /// Every throw in a file uses the set of the last endpoint classified in it.
    File,
}

impl ScopeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::File => "file",
        }
    }
}

impl fmt::Display for ScopeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScopeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "class" => Ok(Self::Class),
            "file" => Ok(Self::File),
            other => Err(format!("unknown scope `{other}`, expected `class` or `file`")),
        }
    }
}

/// Configuration for the contract check itself.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Constructor name throw sites must use. Default: `ApiError`.
    pub error_class: Option<String>,
    /// Identifier-set scoping. Default: `class`.
    pub scope: Option<ScopeMode>,
}

impl AnalysisConfig {
    pub fn effective_error_class(&self) -> &str {
        self.error_class.as_deref().unwrap_or(DEFAULT_ERROR_CLASS)
    }

    pub fn effective_scope(&self) -> ScopeMode {
        self.scope.unwrap_or_default()
    }
}
