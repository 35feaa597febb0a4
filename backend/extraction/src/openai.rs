use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use stockscan_core::{ExtractionProvider, ExtractionRequest, ExtractionResponse, StockError};

use crate::gemini::transport_error;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const PROVIDER: &str = "openai";

/// Any chat-completions compatible endpoint that accepts `image_url` parts.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Value>,
    max_tokens: u32,
    response_format: Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn build_request(request: &ExtractionRequest) -> ChatRequest {
    ChatRequest {
        model: request.model.clone(),
        messages: vec![
            json!({ "role": "system", "content": request.system_instruction }),
            json!({
                "role": "user",
                "content": [
                    { "type": "image_url", "image_url": { "url": request.image.data_url() } },
                    { "type": "text", "text": format!(
                        "{}\nReply with one JSON object using exactly these keys: {}.",
                        request.prompt,
                        schema_keys(&request.response_schema)
                    ) }
                ]
            }),
        ],
        max_tokens: 512,
        response_format: json!({ "type": "json_object" }),
    }
}

/// Property names of the response schema, comma separated.
fn schema_keys(schema: &Value) -> String {
    schema["properties"]
        .as_object()
        .map(|props| props.keys().cloned().collect::<Vec<_>>().join(", "))
        .unwrap_or_default()
}

#[async_trait]
impl ExtractionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResponse, StockError> {
        let start = Instant::now();
        info!(model = %request.model, "[Extraction] Reading label via OpenAI-compatible endpoint");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&build_request(request))
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, self.timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(StockError::Http {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body: error_body,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| StockError::MalformedResponse(format!("chat envelope: {e}")))?;

        let text = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(latency_ms, chars = text.len(), "OpenAI-compatible endpoint answered");

        Ok(ExtractionResponse {
            text,
            provider: PROVIDER.to_string(),
            model: request.model.clone(),
            latency_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::response_schema;
    use stockscan_core::EncodedFrame;

    #[test]
    fn test_request_carries_data_url_and_keys() {
        let request = ExtractionRequest {
            model: DEFAULT_MODEL.into(),
            system_instruction: "sys".into(),
            prompt: "read it".into(),
            image: EncodedFrame::jpeg("AAAA", 2, 2),
            response_schema: response_schema(),
        };
        let body = serde_json::to_value(build_request(&request)).unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(
            body["messages"][1]["content"][0]["image_url"]["url"],
            "data:image/jpeg;base64,AAAA"
        );
        let text = body["messages"][1]["content"][1]["text"].as_str().unwrap();
        assert!(text.contains("productType"));
        assert_eq!(body["response_format"]["type"], "json_object");
    }
}
