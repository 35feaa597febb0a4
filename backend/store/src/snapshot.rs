//! The inventory snapshot: the whole item list serialized as one JSON array
//! under a fixed key.

use std::sync::Arc;

use stockscan_core::{Item, StockError};
use tracing::{error, info, warn};

use crate::kv::KeyValueStore;

/// Key holding the serialized inventory.
pub const SNAPSHOT_KEY: &str = "inventory_data";

/// Key holding a user-supplied extraction API key.
pub const API_KEY_KEY: &str = "gemini_api_key";

/// Suffix of the key that receives an unparseable snapshot before it is
/// replaced.
const CORRUPT_SUFFIX: &str = "_corrupt";

/// Outcome of reading the snapshot. Never an error: every failure degrades to
/// an empty inventory.
#[derive(Debug)]
pub enum SnapshotLoad {
    /// Nothing stored yet (first run).
    Missing,
    Loaded(Vec<Item>),
    /// The store could not be read.
    Unreadable { error: String },
    /// The stored text is not a valid snapshot. A copy was kept under
    /// `backup_key` when possible.
    Corrupt {
        error: String,
        backup_key: Option<String>,
    },
}

impl SnapshotLoad {
    /// Items to start with.
    pub fn into_items(self) -> Vec<Item> {
        match self {
            SnapshotLoad::Loaded(items) => items,
            _ => Vec::new(),
        }
    }
}

/// Reads and writes the inventory snapshot through a [`KeyValueStore`].
#[derive(Clone)]
pub struct SnapshotStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl SnapshotStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            key: SNAPSHOT_KEY.to_string(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying key-value store, shared with other settings.
    pub fn kv(&self) -> &Arc<dyn KeyValueStore> {
        &self.kv
    }

    /// Load the snapshot, normalizing every item so fallbacks hold.
    pub async fn load(&self) -> SnapshotLoad {
        let raw = match self.kv.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!(key = %self.key, "No inventory snapshot yet; starting empty");
                return SnapshotLoad::Missing;
            }
            Err(e) => {
                error!(key = %self.key, error = %e, "Failed to read inventory snapshot; starting empty");
                return SnapshotLoad::Unreadable {
                    error: e.to_string(),
                };
            }
        };

        match decode_snapshot(&raw) {
            Ok(items) => {
                info!(key = %self.key, count = items.len(), "Loaded inventory snapshot");
                SnapshotLoad::Loaded(items)
            }
            Err(e) => {
                error!(key = %self.key, error = %e, "Failed to load inventory; starting empty");
                let backup_key = format!("{}{}", self.key, CORRUPT_SUFFIX);
                let backup_key = match self.kv.set(&backup_key, &raw).await {
                    Ok(()) => {
                        warn!(backup = %backup_key, "Kept unreadable snapshot");
                        Some(backup_key)
                    }
                    Err(backup_err) => {
                        warn!(error = %backup_err, "Failed to back up unreadable snapshot");
                        None
                    }
                };
                SnapshotLoad::Corrupt {
                    error: e.to_string(),
                    backup_key,
                }
            }
        }
    }

    /// Serialize and store the full item list.
    pub async fn save(&self, items: &[Item]) -> Result<(), StockError> {
        let raw = encode_snapshot(items)?;
        self.kv
            .set(&self.key, &raw)
            .await
            .map_err(|e| StockError::Storage(e.to_string()))
    }
}

/// Parse a snapshot JSON array.
pub fn decode_snapshot(raw: &str) -> Result<Vec<Item>, serde_json::Error> {
    let items: Vec<Item> = serde_json::from_str(raw)?;
    Ok(items.into_iter().map(Item::normalize).collect())
}

/// Serialize items as a snapshot JSON array.
pub fn encode_snapshot(items: &[Item]) -> Result<String, StockError> {
    serde_json::to_string(items).map_err(|e| StockError::Storage(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use stockscan_core::ItemDraft;

    fn item(brand: &str, ts: i64) -> Item {
        ItemDraft {
            brand: Some(brand.into()),
            ..Default::default()
        }
        .into_item(ts)
    }

    #[tokio::test]
    async fn test_snapshot_round_trip_preserves_order() {
        let store = SnapshotStore::new(Arc::new(MemoryKvStore::new()));
        let items = vec![item("B", 2), item("A", 1), item("C", 3)];

        store.save(&items).await.unwrap();
        let loaded = store.load().await.into_items();
        assert_eq!(loaded, items);
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_empty() {
        let store = SnapshotStore::new(Arc::new(MemoryKvStore::new()));
        assert!(matches!(store.load().await, SnapshotLoad::Missing));
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_backed_up() {
        let kv = Arc::new(MemoryKvStore::new());
        kv.set(SNAPSHOT_KEY, "{not json").await.unwrap();
        let store = SnapshotStore::new(kv.clone());

        match store.load().await {
            SnapshotLoad::Corrupt { backup_key, .. } => {
                assert_eq!(backup_key.as_deref(), Some("inventory_data_corrupt"));
            }
            other => panic!("expected corrupt snapshot, got {other:?}"),
        }
        assert_eq!(
            kv.get("inventory_data_corrupt").await.unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[tokio::test]
    async fn test_wrong_shape_is_corrupt() {
        let kv = Arc::new(MemoryKvStore::new());
        kv.set(SNAPSHOT_KEY, r#"{"items": []}"#).await.unwrap();
        let store = SnapshotStore::new(kv);
        assert!(store.load().await.into_items().is_empty());
    }

    #[test]
    fn test_decode_accepts_original_ids() {
        let raw = r#"[{"id":"k3j9x0a1b","barcode":"8721222061311","name":"RONNY TAPERED","brand":"TOMMY JEANS","season":"FW24","model":"DM0DM221861BX","productType":"Jeans","color":"Denim Dark","size":"32 32","price":"99.90 EUR","quantity":1,"timestamp":1718000000000}]"#;
        let items = decode_snapshot(raw).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "k3j9x0a1b");
        assert_eq!(items[0].product_type, "Jeans");
    }
}
