//! Tests for the errcontract configuration system.

use std::sync::Mutex;

use errcontract_core::config::contract_config::{
    CliOverrides, ContractConfig, ENV_ENDPOINT_BASE, ENV_ERROR_CLASS, ENV_FORMAT, ENV_SCOPE,
    ENV_TSCONFIG,
};
use errcontract_core::config::{ReportFormat, ScopeMode};
use errcontract_core::errors::ConfigError;

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

fn clear_env_vars() {
    for key in [
        ENV_TSCONFIG,
        ENV_ENDPOINT_BASE,
        ENV_ERROR_CLASS,
        ENV_SCOPE,
        ENV_FORMAT,
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_defaults_without_files() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    let dir = tempdir();
    let config = ContractConfig::load(dir.path(), None, None).unwrap();

    assert_eq!(
        config.project.effective_tsconfig(),
        "packages/backend/tsconfig.json"
    );
    assert_eq!(
        config.project.effective_endpoint_base(),
        "packages/backend/src/server/api/endpoint-base.ts"
    );
    assert_eq!(config.analysis.effective_error_class(), "ApiError");
    assert_eq!(config.analysis.effective_scope(), ScopeMode::Class);
    assert_eq!(config.report.effective_format(), ReportFormat::Console);
    assert!(config.project.effective_follow_imports());
}

#[test]
fn test_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    let dir = tempdir();
    std::fs::write(
        dir.path().join("errcontract.toml"),
        r#"
[project]
tsconfig = "tsconfig.json"
endpoint_base = "src/endpoint-base.ts"

[analysis]
error_class = "HttpError"
scope = "file"
"#,
    )
    .unwrap();

    std::env::set_var(ENV_ERROR_CLASS, "EnvError");
    let cli = CliOverrides {
        scope: Some(ScopeMode::Class),
        format: Some(ReportFormat::Json),
        ..Default::default()
    };

    let config = ContractConfig::load(dir.path(), None, Some(&cli)).unwrap();

    assert_eq!(config.project.effective_tsconfig(), "tsconfig.json");
    assert_eq!(config.project.effective_endpoint_base(), "src/endpoint-base.ts");
    // Env beats the project file.
    assert_eq!(config.analysis.effective_error_class(), "EnvError");
    // CLI beats the project file.
    assert_eq!(config.analysis.effective_scope(), ScopeMode::Class);
    assert_eq!(config.report.effective_format(), ReportFormat::Json);

    clear_env_vars();
}

#[test]
fn test_explicit_config_must_exist() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    let dir = tempdir();
    let missing = dir.path().join("nope.toml");
    let err = ContractConfig::load(dir.path(), Some(&missing), None).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("errcontract.toml"), "[analysis\nscope = ").unwrap();
    let err = ContractConfig::load(dir.path(), None, None).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_invalid_env_scope_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    std::env::set_var(ENV_SCOPE, "module");
    let dir = tempdir();
    let err = ContractConfig::load(dir.path(), None, None).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
    clear_env_vars();
}

#[test]
fn test_validation_rejects_absolute_paths_and_bad_class() {
    let config = ContractConfig::from_toml(
        r#"
[project]
tsconfig = "/etc/tsconfig.json"
"#,
    )
    .unwrap();
    let err = ContractConfig::validate(&config).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "project.tsconfig"));

    let config = ContractConfig::from_toml(
        r#"
[analysis]
error_class = "Api Error"
"#,
    )
    .unwrap();
    let err = ContractConfig::validate(&config).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "analysis.error_class"));

    let config = ContractConfig::from_toml(
        r#"
[analysis]
error_class = "errors.ApiError"
"#,
    )
    .unwrap();
    assert!(ContractConfig::validate(&config).is_ok());
}

#[test]
fn test_unknown_keys_are_ignored() {
    let config = ContractConfig::from_toml(
        r#"
[analysis]
scope = "file"
future_option = true

[telemetry]
enabled = false
"#,
    )
    .unwrap();
    assert_eq!(config.analysis.effective_scope(), ScopeMode::File);
}

#[test]
fn test_toml_round_trip_keeps_overrides() {
    let config = ContractConfig::from_toml(
        r#"
[report]
format = "json"
"#,
    )
    .unwrap();
    let text = config.to_toml().unwrap();
    let back = ContractConfig::from_toml(&text).unwrap();
    assert_eq!(back.report.effective_format(), ReportFormat::Json);
}

#[test]
fn test_paths_are_joined_to_root() {
    let config = ContractConfig::default();
    let root = std::path::Path::new("/work/misskey");
    assert_eq!(
        config.tsconfig_path(root),
        root.join("packages/backend/tsconfig.json")
    );
    assert_eq!(
        config.endpoint_base_path(root),
        root.join("packages/backend/src/server/api/endpoint-base.ts")
    );
}
