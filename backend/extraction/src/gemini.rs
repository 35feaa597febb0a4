use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use stockscan_core::{ExtractionProvider, ExtractionRequest, ExtractionResponse, StockError};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const PROVIDER: &str = "gemini";

/// Google Gemini `generateContent` provider.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiProvider {
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
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

fn text_part(text: &str) -> Part {
    Part {
        text: Some(text.to_string()),
        inline_data: None,
    }
}

/// Map a transport failure to the error taxonomy.
pub(crate) fn transport_error(provider: &str, timeout: Duration, e: reqwest::Error) -> StockError {
    if e.is_timeout() {
        StockError::Timeout(timeout.as_secs())
    } else {
        StockError::Network {
            provider: provider.to_string(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl ExtractionProvider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResponse, StockError> {
        let start = Instant::now();
        info!(model = %request.model, bytes = request.image.data_base64.len(), "[Extraction] Reading label via Gemini");

        let body = GenerateRequest {
            system_instruction: Content {
                parts: vec![text_part(&request.system_instruction)],
            },
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: request.image.mime_type.clone(),
                            data: request.image.data_base64.clone(),
                        }),
                    },
                    text_part(&request.prompt),
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: request.response_schema.clone(),
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&body)
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

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| StockError::MalformedResponse(format!("Gemini envelope: {e}")))?;

        let text = candidate_text(parsed);
        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(latency_ms, chars = text.len(), "Gemini answered");

        Ok(ExtractionResponse {
            text,
            provider: PROVIDER.to_string(),
            model: request.model.clone(),
            latency_ms,
        })
    }
}

/// Concatenated text parts of the first candidate.
fn candidate_text(response: GenerateResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"brand\":"},{"text":"\"X\"}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(candidate_text(response), r#"{"brand":"X"}"#);
    }

    #[test]
    fn test_blocked_candidate_is_empty() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert_eq!(candidate_text(response), "");
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(candidate_text(response), "");
    }

    #[test]
    fn test_request_wire_shape() {
        let body = GenerateRequest {
            system_instruction: Content {
                parts: vec![text_part("sys")],
            },
            contents: vec![Content {
                parts: vec![Part {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: "image/jpeg".into(),
                        data: "AAAA".into(),
                    }),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".into(),
                response_schema: serde_json::json!({"type": "OBJECT"}),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "sys");
        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/jpeg");
        assert!(json["contents"][0]["parts"][0].get("text").is_none());
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
    }
}
