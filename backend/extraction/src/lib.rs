//! Label extraction: ship a product-label photo to a hosted vision model and
//! turn its answer into an [`ItemDraft`](stockscan_core::ItemDraft).

pub mod extractor;
pub mod gemini;
pub mod key;
pub mod mock;
pub mod openai;
pub mod parse;
pub mod prompt;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use stockscan_core::{ExtractionProvider, StockError};

pub use extractor::LabelExtractor;
pub use gemini::GeminiProvider;
pub use key::{resolve_api_key, resolve_key_source_with, validate_api_key, KeySource};
pub use mock::MockProvider;
pub use openai::OpenAiProvider;
pub use parse::{parse_draft, strip_code_fences};

/// Supported extraction back ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    Mock,
}

impl ProviderKind {
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => gemini::DEFAULT_MODEL,
            ProviderKind::OpenAi => openai::DEFAULT_MODEL,
            ProviderKind::Mock => "mock",
        }
    }

    pub fn needs_api_key(&self) -> bool {
        !matches!(self, ProviderKind::Mock)
    }
}

impl FromStr for ProviderKind {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" | "openai-compatible" => Ok(ProviderKind::OpenAi),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(StockError::Config(format!(
                "unknown extraction provider {other:?} (expected gemini, openai or mock)"
            ))),
        }
    }
}

/// Settings needed to build a provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
    /// Canned answer for the mock provider.
    pub mock_response: Option<String>,
}

/// Build the configured provider. Real providers refuse to start without a
/// usable API key.
pub fn build_provider(settings: &ProviderSettings) -> Result<Arc<dyn ExtractionProvider>, StockError> {
    let provider: Arc<dyn ExtractionProvider> = match settings.kind {
        ProviderKind::Gemini => {
            let key = require_key(settings)?;
            let mut p = GeminiProvider::new(key).with_timeout(settings.timeout);
            if let Some(url) = &settings.base_url {
                p = p.with_base_url(url);
            }
            Arc::new(p)
        }
        ProviderKind::OpenAi => {
            let key = require_key(settings)?;
            let mut p = OpenAiProvider::new(key).with_timeout(settings.timeout);
            if let Some(url) = &settings.base_url {
                p = p.with_base_url(url);
            }
            Arc::new(p)
        }
        ProviderKind::Mock => Arc::new(
            MockProvider::new("mock")
                .with_response(settings.mock_response.clone().unwrap_or_else(|| "{}".to_string())),
        ),
    };
    Ok(provider)
}

fn require_key(settings: &ProviderSettings) -> Result<String, StockError> {
    settings
        .api_key
        .as_deref()
        .and_then(validate_api_key)
        .ok_or(StockError::MissingApiKey)
}
