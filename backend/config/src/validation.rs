//! Config validation: every problem found in one pass, with its field path.

use crate::schema::StockscanConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Provider names accepted in `extraction.provider`, compared
/// case-insensitively after trimming.
pub const PROVIDER_NAMES: [&str; 5] = ["gemini", "google", "openai", "openai-compatible", "mock"];

pub fn validate(config: &StockscanConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_extraction(config, &mut report);
    validate_storage(config, &mut report);
    validate_scanner(config, &mut report);
    report
}

fn validate_extraction(config: &StockscanConfig, report: &mut ValidationReport) {
    let Some(extraction) = &config.extraction else { return };
    if let Some(provider) = &extraction.provider {
        let name = provider.trim().to_ascii_lowercase();
        if !PROVIDER_NAMES.contains(&name.as_str()) {
            report.error(
                "extraction.provider",
                format!("Unknown provider '{provider}'. Use 'gemini', 'openai', or 'mock'"),
            );
        }
    }
    if extraction.timeout_secs == Some(0) {
        report.error("extraction.timeoutSecs", "timeoutSecs must be >= 1");
    }
    if let Some(url) = &extraction.base_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            report.error("extraction.baseUrl", "baseUrl must start with http:// or https://");
        }
    }
    if let Some(key) = &extraction.api_key {
        if !key.contains("${") && key.trim().len() <= 20 {
            report.warn("extraction.apiKey", "API key looks too short and will be ignored");
        }
    }
}

fn validate_storage(config: &StockscanConfig, report: &mut ValidationReport) {
    let Some(storage) = &config.storage else { return };
    if let Some(key) = &storage.snapshot_key {
        let ok = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !ok {
            report.error(
                "storage.snapshotKey",
                "snapshotKey may only contain letters, digits, '_' and '-'",
            );
        }
    }
}

fn validate_scanner(config: &StockscanConfig, report: &mut ValidationReport) {
    let Some(scanner) = &config.scanner else { return };
    if let Some(quality) = scanner.jpeg_quality {
        if !(1..=100).contains(&quality) {
            report.error("scanner.jpegQuality", "jpegQuality must be between 1 and 100");
        }
    }
    match scanner.capture_width {
        Some(0) => report.error("scanner.captureWidth", "captureWidth must be > 0"),
        Some(w) if w < 320 => report.warn(
            "scanner.captureWidth",
            format!("captureWidth {w} is likely too small to read a label"),
        ),
        _ => {}
    }
    if let Some(facing) = &scanner.facing {
        if !matches!(
            facing.to_ascii_lowercase().as_str(),
            "environment" | "env" | "rear" | "back" | "user" | "front" | "selfie"
        ) {
            report.error(
                "scanner.facing",
                format!("Unknown facing '{facing}'. Use 'environment' or 'user'"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ExtractionConfig, ScannerConfig, StorageConfig};

    #[test]
    fn empty_config_is_valid() {
        let report = validate(&StockscanConfig::default());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn provider_aliases_are_accepted() {
        for provider in ["Gemini", "google", " OpenAI ", "openai-compatible", "MOCK"] {
            let cfg = StockscanConfig {
                extraction: Some(ExtractionConfig {
                    provider: Some(provider.into()),
                    ..Default::default()
                }),
                ..Default::default()
            };
            let report = validate(&cfg);
            assert!(report.is_valid(), "{provider}: {:?}", report.errors);
        }
    }

    #[test]
    fn reports_every_problem() {
        let cfg = StockscanConfig {
            extraction: Some(ExtractionConfig {
                provider: Some("claude".into()),
                api_key: Some("short".into()),
                ..Default::default()
            }),
            storage: Some(StorageConfig {
                snapshot_key: Some("../escape".into()),
                ..Default::default()
            }),
            scanner: Some(ScannerConfig {
                jpeg_quality: Some(0),
                capture_width: Some(200),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        let paths: Vec<&str> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["extraction.provider", "storage.snapshotKey", "scanner.jpegQuality"]
        );
        assert_eq!(report.warnings.len(), 2);
    }
}
