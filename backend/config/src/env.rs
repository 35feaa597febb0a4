//! `${VAR}` substitution in config string values.
//!
//! Only uppercase `[A-Z_][A-Z0-9_]*` names are matched. `$${VAR}` is an
//! escape and yields a literal `${VAR}`. A referenced variable that is unset
//! or empty is an error naming the config path.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

/// Optional leading `$` marks an escaped reference.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references from the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    let env: HashMap<String, String> = std::env::vars().collect();
    Ok(substitute_value(value, &env, "")?)
}

/// Substitute env vars using a provided map.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    Ok(substitute_value(value, env, "")?)
}

fn substitute_value(
    value: &Value,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<Value, MissingEnvVarError> {
    match value {
        Value::String(s) => substitute_string(s, env, path).map(Value::String),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(
    s: &str,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<String, MissingEnvVarError> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    match missing {
        Some(err) => Err(err),
        None => Ok(substituted.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_var() {
        let v = json!({"extraction": {"apiKey": "${GEMINI_API_KEY}"}});
        let env = env(&[("GEMINI_API_KEY", "AIza-secret")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["extraction"]["apiKey"], "AIza-secret");
    }

    #[test]
    fn error_names_var_and_path() {
        let v = json!({"storage": {"dataDir": "${HOME_BASE}/data"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("HOME_BASE"));
        assert!(msg.contains("storage.dataDir"));
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"prompt": "use $${NOT_A_VAR} and ${NAME}"});
        let env = env(&[("NAME", "x")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["prompt"], "use ${NOT_A_VAR} and x");
    }

    #[test]
    fn passthrough_plain_values() {
        let v = json!({"key": "plain-$tring", "n": 3, "lower": "${lower}"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result, v);
    }
}
