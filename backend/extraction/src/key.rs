//! API key lookup and sanity checks.

/// Environment variables consulted, in order, when no key is stored or configured.
pub const KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Keys this short are typos or placeholders.
const MIN_KEY_LEN: usize = 20;

/// Trim a candidate key and reject placeholders. Returns the usable key.
pub fn validate_api_key(raw: &str) -> Option<String> {
    let key = raw.trim();
    if key.len() <= MIN_KEY_LEN || key == "undefined" || key == "null" {
        return None;
    }
    Some(key.to_string())
}

/// Where a resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Stored,
    Config,
    Env(&'static str),
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Stored => f.write_str("saved key"),
            KeySource::Config => f.write_str("config file"),
            KeySource::Env(name) => write!(f, "${name}"),
        }
    }
}

/// Pick the first usable key: stored by the user, then configured, then the
/// process environment.
pub fn resolve_api_key(stored: Option<&str>, configured: Option<&str>) -> Option<String> {
    resolve_api_key_with(stored, configured, |name| std::env::var(name).ok())
}

/// Same as [`resolve_api_key`] with an injectable environment (useful for testing).
pub fn resolve_api_key_with<F>(stored: Option<&str>, configured: Option<&str>, env: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    resolve_key_source_with(stored, configured, env).map(|(key, _)| key)
}

/// Resolve a key and report which source supplied it.
pub fn resolve_key_source_with<F>(
    stored: Option<&str>,
    configured: Option<&str>,
    env: F,
) -> Option<(String, KeySource)>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = stored.and_then(validate_api_key) {
        return Some((key, KeySource::Stored));
    }
    if let Some(key) = configured.and_then(validate_api_key) {
        return Some((key, KeySource::Config));
    }
    KEY_ENV_VARS.iter().find_map(|name| {
        env(name)
            .as_deref()
            .and_then(validate_api_key)
            .map(|key| (key, KeySource::Env(*name)))
    })
}
