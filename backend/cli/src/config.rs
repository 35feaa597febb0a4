//! Runtime settings resolved from `config.yaml`.

use std::path::PathBuf;
use std::time::Duration;

use stockscan_capture::{Facing, FrameEncoding};
use stockscan_config::StockscanConfig;
use stockscan_core::StockError;
use stockscan_extraction::{ProviderKind, ProviderSettings};
use stockscan_inventory::ScanDelays;
use stockscan_logging::LogOptions;

/// Everything a command needs, with defaults already applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
    pub snapshot_key: String,
    pub provider: ProviderKind,
    pub model: String,
    pub configured_api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub system_instruction: Option<String>,
    pub prompt: Option<String>,
    pub mock_response: Option<String>,
    pub encoding: FrameEncoding,
    pub delays: ScanDelays,
    pub facing: Facing,
    pub log: LogOptions,
}

impl Settings {
    /// Build settings from a config that went through `load_and_prepare`.
    pub fn from_config(config: &StockscanConfig, config_path: PathBuf) -> Result<Self, StockError> {
        let extraction = config.extraction();
        let storage = config.storage();
        let scanner = config.scanner();
        let logging = config.logging();

        let provider: ProviderKind = extraction.provider.as_deref().unwrap_or("gemini").parse()?;
        let model = extraction
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());
        let facing: Facing = scanner.facing.as_deref().unwrap_or("environment").parse()?;
        let defaults = FrameEncoding::default();
        let default_delays = ScanDelays::default();

        Ok(Self {
            data_dir: PathBuf::from(
                storage
                    .data_dir
                    .ok_or_else(|| StockError::Config("storage.dataDir is not set".into()))?,
            ),
            snapshot_key: storage
                .snapshot_key
                .unwrap_or_else(|| stockscan_store::SNAPSHOT_KEY.to_string()),
            provider,
            model,
            configured_api_key: extraction.api_key,
            base_url: extraction.base_url,
            timeout: Duration::from_secs(extraction.timeout_secs.unwrap_or(60)),
            system_instruction: extraction.system_instruction,
            prompt: extraction.prompt,
            mock_response: extraction.mock_response,
            encoding: FrameEncoding {
                target_width: scanner.capture_width.unwrap_or(defaults.target_width),
                jpeg_quality: scanner.jpeg_quality.unwrap_or(defaults.jpeg_quality),
            },
            delays: ScanDelays {
                success: scanner
                    .success_delay_ms
                    .map(Duration::from_millis)
                    .unwrap_or(default_delays.success),
                error: scanner
                    .error_delay_ms
                    .map(Duration::from_millis)
                    .unwrap_or(default_delays.error),
            },
            facing,
            log: LogOptions {
                level: logging.level.unwrap_or_else(|| "warn".to_string()),
                dir: logging.dir.map(PathBuf::from),
                json_console: logging.json.unwrap_or(false),
            },
            config_path,
        })
    }

    pub fn provider_settings(&self, api_key: Option<String>) -> ProviderSettings {
        ProviderSettings {
            kind: self.provider,
            api_key,
            base_url: self.base_url.clone(),
            timeout: self.timeout,
            mock_response: self.mock_response.clone(),
        }
    }
}
