//! Configuration system for errcontract.
//! TOML-based, layered resolution: CLI > env > project file > defaults.

pub mod analysis_config;
pub mod contract_config;
pub mod project_config;
pub mod report_config;

pub use analysis_config::{AnalysisConfig, ScopeMode};
pub use contract_config::{CliOverrides, ContractConfig};
pub use project_config::ProjectConfig;
pub use report_config::{ReportConfig, ReportFormat};
