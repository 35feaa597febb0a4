//! Config file read/write with atomic backup rotation.

use crate::schema::StockscanConfig;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

const CONFIG_FILE_NAME: &str = "config.yaml";

/// Number of rolling backups to keep.
const MAX_BACKUPS: usize = 5;

/// Resolve the config directory.
/// Priority: `STOCKSCAN_CONFIG_DIR` env > `~/.stockscan/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("STOCKSCAN_CONFIG_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    match dirs::home_dir() {
        Some(home) => home.join(".stockscan"),
        None => PathBuf::from(".stockscan"),
    }
}

pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<StockscanConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(StockscanConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(StockscanConfig::default());
    }

    let config: StockscanConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Write config to disk atomically, keeping a rolling backup of the previous
/// file.
pub async fn write_config(config: &StockscanConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    if path.exists() {
        rotate_backups(path).await;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, yaml.as_bytes())
        .await
        .with_context(|| format!("Failed to write temp config: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp config to: {}", path.display()))?;

    info!(path = %path.display(), "Wrote config");
    Ok(())
}

/// config.yaml.bak.1 → .bak.2 → ... → .bak.N, then copy the current file to .bak.1
async fn rotate_backups(path: &Path) {
    for i in (1..MAX_BACKUPS).rev() {
        let old = path.with_extension(format!("yaml.bak.{i}"));
        let new = path.with_extension(format!("yaml.bak.{}", i + 1));
        if old.exists() {
            if let Err(e) = fs::rename(&old, &new).await {
                warn!("Failed to rotate backup {}: {}", old.display(), e);
            }
        }
    }

    let bak = path.with_extension("yaml.bak.1");
    if let Err(e) = fs::copy(path, &bak).await {
        warn!("Failed to create backup {}: {}", bak.display(), e);
    }
}

/// Patch config with a JSON Merge Patch (RFC 7396).
pub fn apply_merge_patch(config: &StockscanConfig, patch: &Value) -> Result<StockscanConfig> {
    let mut value =
        serde_json::to_value(config).context("Failed to serialize config for merge patch")?;
    json_merge_patch(&mut value, patch);
    serde_json::from_value(value).context("Failed to deserialize config after merge patch")
}

/// Build a merge patch that sets one dotted path, e.g.
/// `scanner.jpegQuality` = `70` → `{"scanner":{"jpegQuality":70}}`.
///
/// The value is parsed as JSON when possible (numbers, booleans, `null` to
/// unset) and taken as a plain string otherwise.
pub fn patch_for_path(dotted: &str, raw_value: &str) -> Result<Value> {
    let segments: Vec<&str> = dotted.split('.').map(str::trim).collect();
    if segments.iter().any(|s| s.is_empty()) {
        anyhow::bail!("Invalid config path '{dotted}'");
    }
    let leaf = serde_json::from_str::<Value>(raw_value)
        .unwrap_or_else(|_| Value::String(raw_value.to_string()));
    Ok(segments.iter().rev().fold(leaf, |acc, key| {
        let mut map = serde_json::Map::new();
        map.insert((*key).to_string(), acc);
        Value::Object(map)
    }))
}

fn json_merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(target_map) = target {
        for (key, patch_val) in patch_map {
            if patch_val.is_null() {
                target_map.remove(key);
            } else {
                let entry = target_map.entry(key.clone()).or_insert(Value::Null);
                json_merge_patch(entry, patch_val);
            }
        }
    }
}
