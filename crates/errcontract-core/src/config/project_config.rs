//! Project layout configuration: where the build configuration and the
//! endpoint base declaration live, relative to the project root.

use serde::{Deserialize, Serialize};

/// Default build configuration path, relative to the project root.
pub const DEFAULT_TSCONFIG: &str = "packages/backend/tsconfig.json";

/// Default location of the endpoint base class, relative to the project root.
pub const DEFAULT_ENDPOINT_BASE: &str = "packages/backend/src/server/api/endpoint-base.ts";

/// Configuration for locating the analyzed program.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    /// Build configuration (tsconfig.json) path. Default: `packages/backend/tsconfig.json`.
    pub tsconfig: Option<String>,
    /// File declaring the endpoint base class.
    /// Default: `packages/backend/src/server/api/endpoint-base.ts`.
    pub endpoint_base: Option<String>,
    /// Load project files reached through imports even when the build
    /// configuration does not list them. Default: true.
    pub follow_imports: Option<bool>,
}

impl ProjectConfig {
    pub fn effective_tsconfig(&self) -> &str {
        self.tsconfig.as_deref().unwrap_or(DEFAULT_TSCONFIG)
    }

    pub fn effective_endpoint_base(&self) -> &str {
        self.endpoint_base.as_deref().unwrap_or(DEFAULT_ENDPOINT_BASE)
    }

    pub fn effective_follow_imports(&self) -> bool {
        self.follow_imports.unwrap_or(true)
    }
}
