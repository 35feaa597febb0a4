//! The inventory state manager: the single owner of the item list.
//!
//! Every mutation is applied in memory first and then persisted as a whole
//! snapshot. A failed write is reported but never rolls the change back.

use stockscan_core::{Item, StockError};
use stockscan_logging::{EventLogger, InventoryEvent};
use stockscan_store::{SnapshotLoad, SnapshotStore};
use tracing::{debug, info};

use crate::sort::SortSpec;

/// Asked before an item is removed.
pub trait Confirm {
    fn confirm(&mut self, item: &Item) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&Item) -> bool,
{
    fn confirm(&mut self, item: &Item) -> bool {
        self(item)
    }
}

/// Confirms every removal (`--yes`).
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, _item: &Item) -> bool {
        true
    }
}

pub struct InventoryManager {
    items: Vec<Item>,
    store: SnapshotStore,
}

impl InventoryManager {
    /// Load the stored snapshot. Never fails: a missing, unreadable or
    /// corrupt snapshot yields an empty inventory.
    pub async fn load(store: SnapshotStore) -> Self {
        let items = match store.load().await {
            SnapshotLoad::Corrupt { backup_key, .. } => {
                info!(backup = ?backup_key, "Starting with an empty inventory");
                Vec::new()
            }
            other => other.into_items(),
        };
        Self { items, store }
    }

    /// An inventory with the given items, not yet persisted.
    pub fn with_items(store: SnapshotStore, items: Vec<Item>) -> Self {
        Self { items, store }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all items.
    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// A sorted copy; the stored order is untouched.
    pub fn sorted(&self, spec: SortSpec) -> Vec<Item> {
        let mut items = self.items.clone();
        spec.sort(&mut items);
        items
    }

    /// Put an item at the front. An item with the same id is replaced.
    pub async fn add(&mut self, item: Item) -> Result<(), StockError> {
        let item = item.normalize();
        if let Some(pos) = self.position(&item.id) {
            debug!(id = %item.id, "Replacing item with duplicate id");
            self.items.remove(pos);
        }
        EventLogger::log_event(InventoryEvent::ItemAdded {
            id: item.id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
        });
        self.items.insert(0, item);
        self.persist().await
    }

    /// Replace the item with id `id`, in place. The stored id is kept even if
    /// `item` carries another one. Returns `false` when no such item exists.
    pub async fn update(&mut self, id: &str, item: Item) -> Result<bool, StockError> {
        let Some(pos) = self.position(id) else {
            debug!(id, "Update for unknown id ignored");
            return Ok(false);
        };
        let mut item = item.normalize();
        item.id = id.to_string();
        EventLogger::log_event(InventoryEvent::ItemUpdated {
            id: item.id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
        });
        self.items[pos] = item;
        self.persist().await?;
        Ok(true)
    }

    /// Remove the item with id `id` once `confirm` agrees. Returns whether
    /// anything was removed.
    pub async fn remove(
        &mut self,
        id: &str,
        confirm: &mut impl Confirm,
    ) -> Result<bool, StockError> {
        let Some(pos) = self.position(id) else {
            debug!(id, "Remove for unknown id ignored");
            return Ok(false);
        };
        if !confirm.confirm(&self.items[pos]) {
            debug!(id, "Removal declined");
            return Ok(false);
        }
        self.items.remove(pos);
        EventLogger::log_event(InventoryEvent::ItemRemoved { id: id.to_string() });
        self.persist().await?;
        Ok(true)
    }

    /// Write the full snapshot.
    pub async fn persist(&self) -> Result<(), StockError> {
        self.store.save(&self.items).await
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use stockscan_core::{now_millis, ItemDraft};
    use stockscan_store::{FileKvStore, KeyValueStore, MemoryKvStore, SNAPSHOT_KEY};

    fn memory_store() -> SnapshotStore {
        SnapshotStore::new(Arc::new(MemoryKvStore::new()))
    }

    fn item(id: &str, name: &str) -> Item {
        ItemDraft {
            id: Some(id.into()),
            name: Some(name.into()),
            ..Default::default()
        }
        .into_item(1_000)
    }

    struct ReadOnlyKv;

    #[async_trait]
    impl KeyValueStore for ReadOnlyKv {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("quota exceeded")
        }

        async fn remove(&self, _key: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_add_prepends_with_fallbacks() {
        let mut inventory = InventoryManager::load(memory_store()).await;
        inventory.add(item("a", "First")).await.unwrap();

        let draft = ItemDraft {
            brand: Some("ACME".into()),
            barcode: Some("123".into()),
            price: Some("10 EUR".into()),
            quantity: Some(2),
            ..Default::default()
        };
        let before = now_millis();
        inventory.add(draft.into_item(now_millis())).await.unwrap();

        assert_eq!(inventory.len(), 2);
        let front = &inventory.items()[0];
        assert_eq!(front.brand, "ACME");
        assert_eq!(front.model, "N/A");
        assert_eq!(front.name, "UNNAMED PRODUCT");
        assert_eq!(front.quantity, 2);
        assert!(front.timestamp >= before && front.timestamp <= now_millis());
        assert_eq!(inventory.items()[1].id, "a");
        assert_eq!(inventory.total_units(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_id_replaces_and_moves_to_front() {
        let mut inventory = InventoryManager::load(memory_store()).await;
        inventory.add(item("a", "Old")).await.unwrap();
        inventory.add(item("b", "Other")).await.unwrap();
        inventory.add(item("a", "New")).await.unwrap();

        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.items()[0].name, "New");
        assert_eq!(inventory.items()[1].id, "b");
    }

    #[tokio::test]
    async fn test_update_existing_and_unknown() {
        let mut inventory = InventoryManager::load(memory_store()).await;
        inventory.add(item("a", "Shirt")).await.unwrap();
        inventory.add(item("b", "Shoe")).await.unwrap();

        let mut changed = item("ignored", "Boot");
        changed.quantity = 4;
        assert!(inventory.update("b", changed).await.unwrap());
        assert_eq!(inventory.len(), 2);
        let b = inventory.get("b").unwrap();
        assert_eq!((b.name.as_str(), b.quantity), ("Boot", 4));
        assert!(inventory.get("ignored").is_none());

        let before = inventory.items().to_vec();
        assert!(!inventory.update("zzz", item("zzz", "Ghost")).await.unwrap());
        assert_eq!(inventory.items(), before.as_slice());
    }

    #[tokio::test]
    async fn test_remove_requires_confirmation() {
        let mut inventory = InventoryManager::load(memory_store()).await;
        inventory.add(item("a", "Shirt")).await.unwrap();

        let mut asked = Vec::new();
        let mut decline = |it: &Item| {
            asked.push(it.id.clone());
            false
        };
        assert!(!inventory.remove("a", &mut decline).await.unwrap());
        assert_eq!(asked, vec!["a".to_string()]);
        assert_eq!(inventory.len(), 1);

        assert!(!inventory.remove("zzz", &mut AlwaysConfirm).await.unwrap());
        assert_eq!(inventory.len(), 1);

        assert!(inventory.remove("a", &mut AlwaysConfirm).await.unwrap());
        assert!(inventory.is_empty());
    }

    #[tokio::test]
    async fn test_mutations_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let kv: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::new(dir.path()));
        {
            let mut inventory = InventoryManager::load(SnapshotStore::new(kv.clone())).await;
            inventory.add(item("a", "Shirt")).await.unwrap();
            inventory.add(item("b", "Shoe")).await.unwrap();
            inventory.add(item("c", "Hat")).await.unwrap();
            inventory.remove("b", &mut AlwaysConfirm).await.unwrap();
        }

        let reloaded = InventoryManager::load(SnapshotStore::new(kv)).await;
        let ids: Vec<&str> = reloaded.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_starts_empty() {
        let kv = Arc::new(MemoryKvStore::new());
        kv.set(SNAPSHOT_KEY, "[{\"id\":").await.unwrap();
        let inventory = InventoryManager::load(SnapshotStore::new(kv.clone())).await;
        assert!(inventory.is_empty());
        assert!(kv.get("inventory_data_corrupt").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_memory_change() {
        let mut inventory = InventoryManager::load(SnapshotStore::new(Arc::new(ReadOnlyKv))).await;
        let err = inventory.add(item("a", "Shirt")).await.unwrap_err();
        assert!(matches!(err, StockError::Storage(_)));
        assert_eq!(inventory.len(), 1);
    }
}
