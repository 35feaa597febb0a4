//! Config defaults: applied after loading so every setting has a value.

use std::path::Path;

use crate::schema::{
    ExtractionConfig, LoggingConfig, ScannerConfig, StockscanConfig, StorageConfig,
};

pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_SNAPSHOT_KEY: &str = "inventory_data";
pub const DEFAULT_CAPTURE_WIDTH: u32 = 1280;
pub const DEFAULT_JPEG_QUALITY: u8 = 85;
pub const DEFAULT_SUCCESS_DELAY_MS: u64 = 1500;
pub const DEFAULT_ERROR_DELAY_MS: u64 = 4000;
pub const DEFAULT_FACING: &str = "environment";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Apply all defaults to a freshly loaded config. Directories default to
/// subdirectories of `config_dir`.
pub fn apply_all_defaults(config: StockscanConfig, config_dir: &Path) -> StockscanConfig {
    let config = apply_extraction_defaults(config);
    let config = apply_storage_defaults(config, config_dir);
    let config = apply_scanner_defaults(config);
    apply_logging_defaults(config, config_dir)
}

fn apply_extraction_defaults(mut config: StockscanConfig) -> StockscanConfig {
    let extraction = config.extraction.get_or_insert_with(ExtractionConfig::default);
    extraction
        .provider
        .get_or_insert_with(|| DEFAULT_PROVIDER.to_string());
    extraction.timeout_secs.get_or_insert(DEFAULT_TIMEOUT_SECS);
    config
}

fn apply_storage_defaults(mut config: StockscanConfig, config_dir: &Path) -> StockscanConfig {
    let storage = config.storage.get_or_insert_with(StorageConfig::default);
    storage
        .data_dir
        .get_or_insert_with(|| config_dir.join("data").display().to_string());
    storage
        .snapshot_key
        .get_or_insert_with(|| DEFAULT_SNAPSHOT_KEY.to_string());
    config
}

fn apply_scanner_defaults(mut config: StockscanConfig) -> StockscanConfig {
    let scanner = config.scanner.get_or_insert_with(ScannerConfig::default);
    scanner.capture_width.get_or_insert(DEFAULT_CAPTURE_WIDTH);
    scanner.jpeg_quality.get_or_insert(DEFAULT_JPEG_QUALITY);
    scanner.success_delay_ms.get_or_insert(DEFAULT_SUCCESS_DELAY_MS);
    scanner.error_delay_ms.get_or_insert(DEFAULT_ERROR_DELAY_MS);
    scanner
        .facing
        .get_or_insert_with(|| DEFAULT_FACING.to_string());
    config
}

fn apply_logging_defaults(mut config: StockscanConfig, config_dir: &Path) -> StockscanConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging
        .dir
        .get_or_insert_with(|| config_dir.join("logs").display().to_string());
    logging.json.get_or_insert(false);
    config
}
