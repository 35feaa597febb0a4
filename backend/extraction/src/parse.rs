//! Turning model output into an [`ItemDraft`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use stockscan_core::{ItemDraft, StockError};

/// A fenced block, optionally tagged (```json ... ```).
static FENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\n?(.*?)```").expect("valid fence regex"));

/// Keys the model may echo back but which are always synthesized locally.
const LOCAL_KEYS: [&str; 3] = ["id", "quantity", "timestamp"];

/// Strip markdown code fences around a JSON answer. Text without fences is
/// returned trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    match FENCE_PATTERN.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Parse a model answer into a draft.
///
/// Id, quantity and timestamp are never taken from the model; they are
/// synthesized locally.
pub fn parse_draft(text: &str) -> Result<ItemDraft, StockError> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(StockError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(body)
        .or_else(|_| serde_json::from_str(outermost_object(body).unwrap_or(body)))
        .map_err(|e| StockError::MalformedResponse(e.to_string()))?;

    let object = match value {
        Value::Object(mut map) => {
            for key in LOCAL_KEYS {
                map.remove(key);
            }
            Value::Object(map)
        }
        other => {
            return Err(StockError::MalformedResponse(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            )))
        }
    };

    serde_json::from_value(object).map_err(|e| StockError::MalformedResponse(e.to_string()))
}

/// `{ ... }` span when the model wrapped JSON in prose.
fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
