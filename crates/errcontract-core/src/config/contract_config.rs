//! Top-level errcontract configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{AnalysisConfig, ProjectConfig, ReportConfig, ReportFormat, ScopeMode};
use crate::errors::ConfigError;

/// Name of the project-level config file looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "errcontract.toml";

pub const ENV_TSCONFIG: &str = "ERRCONTRACT_TSCONFIG";
pub const ENV_ENDPOINT_BASE: &str = "ERRCONTRACT_ENDPOINT_BASE";
pub const ENV_ERROR_CLASS: &str = "ERRCONTRACT_ERROR_CLASS";
pub const ENV_SCOPE: &str = "ERRCONTRACT_SCOPE";
pub const ENV_FORMAT: &str = "ERRCONTRACT_FORMAT";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`ERRCONTRACT_*`)
/// 3. Project config (`errcontract.toml` in the project root, or an explicit path)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ContractConfig {
    pub project: ProjectConfig,
    pub analysis: AnalysisConfig,
    pub report: ReportConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub tsconfig: Option<String>,
    pub endpoint_base: Option<String>,
    pub error_class: Option<String>,
    pub scope: Option<ScopeMode>,
    pub format: Option<ReportFormat>,
}

impl ContractConfig {
    /// Load configuration with layered resolution.
    ///
    /// `explicit` names a config file that must exist; without it the
    /// project file `errcontract.toml` in `root` is used when present.
    pub fn load(
        root: &Path,
        explicit: Option<&Path>,
        cli_overrides: Option<&CliOverrides>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 3: project config
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                Self::merge_toml_file(&mut config, path)?;
            }
            None => {
                let project_config_path = root.join(PROJECT_CONFIG_FILE);
                if project_config_path.exists() {
                    Self::merge_toml_file(&mut config, &project_config_path)?;
                }
            }
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config)?;

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &ContractConfig) -> Result<(), ConfigError> {
        Self::validate_relative("project.tsconfig", config.project.effective_tsconfig())?;
        Self::validate_relative(
            "project.endpoint_base",
            config.project.effective_endpoint_base(),
        )?;

        let class = config.analysis.effective_error_class();
        let valid_class = !class.is_empty()
            && class
                .split('.')
                .all(|part| !part.is_empty() && part.chars().all(is_identifier_char))
            && !class.starts_with(|c: char| c.is_ascii_digit());
        if !valid_class {
            return Err(ConfigError::ValidationFailed {
                field: "analysis.error_class".to_string(),
                message: format!("`{class}` is not a valid constructor name"),
            });
        }
        Ok(())
    }

    fn validate_relative(field: &str, value: &str) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: field.to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if Path::new(value).is_absolute() {
            return Err(ConfigError::ValidationFailed {
                field: field.to_string(),
                message: "must be relative to the project root".to_string(),
            });
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut ContractConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: ContractConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` value.
    fn merge(base: &mut ContractConfig, other: &ContractConfig) {
        // Project
        if other.project.tsconfig.is_some() {
            base.project.tsconfig = other.project.tsconfig.clone();
        }
        if other.project.endpoint_base.is_some() {
            base.project.endpoint_base = other.project.endpoint_base.clone();
        }
        if other.project.follow_imports.is_some() {
            base.project.follow_imports = other.project.follow_imports;
        }

        // Analysis
        if other.analysis.error_class.is_some() {
            base.analysis.error_class = other.analysis.error_class.clone();
        }
        if other.analysis.scope.is_some() {
            base.analysis.scope = other.analysis.scope;
        }

        // Report
        if other.report.format.is_some() {
            base.report.format = other.report.format;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(config: &mut ContractConfig) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var(ENV_TSCONFIG) {
            config.project.tsconfig = Some(val);
        }
        if let Ok(val) = std::env::var(ENV_ENDPOINT_BASE) {
            config.project.endpoint_base = Some(val);
        }
        if let Ok(val) = std::env::var(ENV_ERROR_CLASS) {
            config.analysis.error_class = Some(val);
        }
        if let Ok(val) = std::env::var(ENV_SCOPE) {
            let scope = val.parse::<ScopeMode>().map_err(|message| ConfigError::InvalidValue {
                field: ENV_SCOPE.to_string(),
                message,
            })?;
            config.analysis.scope = Some(scope);
        }
        if let Ok(val) = std::env::var(ENV_FORMAT) {
            let format =
                val.parse::<ReportFormat>().map_err(|message| ConfigError::InvalidValue {
                    field: ENV_FORMAT.to_string(),
                    message,
                })?;
            config.report.format = Some(format);
        }
        Ok(())
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut ContractConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.tsconfig {
            config.project.tsconfig = Some(v.clone());
        }
        if let Some(ref v) = cli.endpoint_base {
            config.project.endpoint_base = Some(v.clone());
        }
        if let Some(ref v) = cli.error_class {
            config.analysis.error_class = Some(v.clone());
        }
        if let Some(v) = cli.scope {
            config.analysis.scope = Some(v);
        }
        if let Some(v) = cli.format {
            config.report.format = Some(v);
        }
    }

    /// Absolute path of the build configuration for `root`.
    pub fn tsconfig_path(&self, root: &Path) -> PathBuf {
        root.join(self.project.effective_tsconfig())
    }

    /// Absolute path of the endpoint base file for `root`.
    pub fn endpoint_base_path(&self, root: &Path) -> PathBuf {
        root.join(self.project.effective_endpoint_base())
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
