//! Config redaction: mask secrets before a config is printed or logged.

use serde_json::Value;

static SENSITIVE_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "apikey",
    "token",
    "accessToken",
    "secret",
    "password",
];

/// Redact a config JSON value, masking sensitive fields to their first four
/// characters followed by `***`.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => {
            let hint: String = s.chars().take(4).collect();
            if s.chars().count() > 4 {
                Value::String(format!("{hint}***"))
            } else {
                Value::String("***".to_string())
            }
        }
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_api_key() {
        let v = json!({ "extraction": { "apiKey": "AIzaSyA1b2C3d4E5f6G7h8I9j0" } });
        let redacted = redact(&v);
        assert_eq!(redacted["extraction"]["apiKey"], "AIza***");
    }

    #[test]
    fn short_secrets_are_fully_masked() {
        let v = json!({ "apiKey": "abc" });
        assert_eq!(redact(&v)["apiKey"], "***");
    }

    #[test]
    fn passthrough_non_sensitive() {
        let v = json!({ "logging": { "level": "debug" }, "storage": { "snapshotKey": "inventory_data" } });
        assert_eq!(redact(&v), v);
    }
}
