use std::sync::Arc;

use tracing::{info, warn};

use stockscan_core::{EncodedFrame, ExtractionProvider, ExtractionRequest, ItemDraft, StockError};

use crate::parse::parse_draft;
use crate::prompt::{response_schema, DEFAULT_PROMPT, DEFAULT_SYSTEM_INSTRUCTION};

/// Sends label photos to a provider and parses the answer.
pub struct LabelExtractor {
    provider: Arc<dyn ExtractionProvider>,
    model: String,
    system_instruction: String,
    prompt: String,
}

impl LabelExtractor {
    pub fn new(provider: Arc<dyn ExtractionProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    pub fn with_system_instruction(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = text.into();
        self
    }

    pub fn with_prompt(mut self, text: impl Into<String>) -> Self {
        self.prompt = text.into();
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One extraction round trip: request, empty check, fence stripping, parse.
    pub async fn extract(&self, frame: EncodedFrame) -> Result<ItemDraft, StockError> {
        let request = ExtractionRequest {
            model: self.model.clone(),
            system_instruction: self.system_instruction.clone(),
            prompt: self.prompt.clone(),
            image: frame,
            response_schema: response_schema(),
        };

        let response = self.provider.extract(&request).await.inspect_err(|e| {
            warn!(provider = self.provider.name(), error = %e, "Extraction call failed");
        })?;

        if response.text.trim().is_empty() {
            warn!(provider = %response.provider, "Extraction returned no text");
            return Err(StockError::EmptyResponse);
        }

        let draft = parse_draft(&response.text)?;
        info!(
            provider = %response.provider,
            model = %response.model,
            latency_ms = response.latency_ms,
            "Label extracted"
        );
        Ok(draft)
    }
}
