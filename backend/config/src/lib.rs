//! Runtime configuration for stockscan.
//!
//! Provides:
//! - Typed config schema (extraction, storage, scanner, logging)
//! - YAML read/write with atomic backup rotation
//! - `${ENV_VAR}` substitution
//! - Config redaction for safe display
//! - Default value application and validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{
    apply_merge_patch, config_dir, config_file_path, load_config, patch_for_path, write_config,
};
pub use redact::redact;
pub use schema::{ExtractionConfig, LoggingConfig, ScannerConfig, StockscanConfig, StorageConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport, PROVIDER_NAMES};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load a config file, substitute env vars and apply defaults, returning the
/// validation report alongside the config without acting on it.
///
/// Nothing is logged here, so a caller may install its subscriber from the
/// loaded config first and report afterwards.
pub async fn load_with_report(path: &Path) -> Result<(StockscanConfig, ValidationReport)> {
    let raw_config = load_config(path).await?;

    let value: Value =
        serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let config: StockscanConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let config = apply_all_defaults(config, base_dir);

    let report = validate(&config);
    Ok((config, report))
}

/// Log every warning and error of a report, then fail if it has errors. The
/// failure message names all of them.
pub fn check_report(report: &ValidationReport) -> Result<()> {
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if !report.is_valid() {
        let all: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
        bail!("{}", all.join("; "));
    }
    Ok(())
}

/// [`load_with_report`] followed by [`check_report`].
pub async fn load_and_prepare(path: &Path) -> Result<StockscanConfig> {
    let (config, report) = load_with_report(path).await?;
    check_report(&report)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_gives_defaults_beside_it() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_and_prepare(&config_file_path(dir.path())).await.unwrap();
        let expected = dir.path().join("data").display().to_string();
        assert_eq!(cfg.storage().data_dir.unwrap(), expected);
        assert_eq!(cfg.extraction().provider.unwrap(), "gemini");
    }

    #[tokio::test]
    async fn invalid_values_fail_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        tokio::fs::write(&path, "scanner:\n  jpegQuality: 0\n").await.unwrap();
        let err = load_and_prepare(&path).await.unwrap_err();
        assert!(err.to_string().contains("scanner.jpegQuality"));
    }

    #[tokio::test]
    async fn report_keeps_every_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        tokio::fs::write(
            &path,
            "scanner:\n  jpegQuality: 0\n  captureWidth: 0\nextraction:\n  timeoutSecs: 0\n",
        )
        .await
        .unwrap();

        let (_, report) = load_with_report(&path).await.unwrap();
        assert_eq!(report.errors.len(), 3);

        let message = check_report(&report).unwrap_err().to_string();
        for field in ["scanner.jpegQuality", "scanner.captureWidth", "extraction.timeoutSecs"] {
            assert!(message.contains(field), "{field} missing from {message}");
        }
    }
}
