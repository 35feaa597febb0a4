use async_trait::async_trait;

use crate::error::StockError;
use crate::frame::EncodedFrame;

/// Trait for the hosted multimodal models that read product labels.
#[async_trait]
pub trait ExtractionProvider: Send + Sync {
    /// Provider name (e.g., "gemini", "openai").
    fn name(&self) -> &str;

    /// Send one image plus instructions and return the raw response text.
    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResponse, StockError>;
}

/// Request to an extraction provider.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub model: String,
    pub system_instruction: String,
    pub prompt: String,
    pub image: EncodedFrame,
    /// JSON schema of the expected object, for providers that accept one.
    pub response_schema: serde_json::Value,
}

/// Raw response from an extraction provider, before parsing.
#[derive(Debug, Clone)]
pub struct ExtractionResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub latency_ms: u64,
}
