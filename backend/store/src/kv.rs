use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

/// Abstract string key-value storage, the local equivalent of a browser's
/// `localStorage`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Keys double as file names, so they are restricted to `[A-Za-z0-9_-]`.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        bail!("store key cannot be empty");
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        bail!("invalid store key {key:?}: only letters, digits, '_' and '-' are allowed");
    }
    Ok(())
}

/// One file per key under a data directory, written atomically.
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            debug!(key, path = %path.display(), "Store key not present");
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read store file: {}", path.display()))?;
        Ok(Some(raw))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).await.with_context(|| {
            format!("Failed to create data directory: {}", self.dir.display())
        })?;

        // Write to temp file, then rename for atomicity.
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value.as_bytes())
            .await
            .with_context(|| format!("Failed to write temp store file: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .await
            .with_context(|| format!("Failed to rename temp store file to: {}", path.display()))?;

        debug!(key, bytes = value.len(), "Store key written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            fs::remove_file(&path)
                .await
                .with_context(|| format!("Failed to remove store file: {}", path.display()))?;
        }
        Ok(())
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.entries.write().await.remove(key);
        Ok(())
    }
}
