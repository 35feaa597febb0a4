use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use stockscan_core::{ExtractionProvider, ExtractionRequest, ExtractionResponse, StockError};

/// An extraction provider that returns canned responses.
pub struct MockProvider {
    name: String,
    fixed_response: Option<String>,
    network_failure: Option<String>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fixed_response: None,
            network_failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    /// Fail every call with a network error carrying `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.network_failure = Some(message.into());
        self
    }

    /// Number of extraction calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResponse, StockError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.network_failure {
            return Err(StockError::Network {
                provider: self.name.clone(),
                message: message.clone(),
            });
        }
        Ok(ExtractionResponse {
            text: self.fixed_response.clone().unwrap_or_else(|| "{}".to_string()),
            provider: self.name.clone(),
            model: request.model.clone(),
            latency_ms: 0,
        })
    }
}
