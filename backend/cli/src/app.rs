//! Per-invocation state: settings, the store, the inventory and the pending
//! slot.

use std::io;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use stockscan_core::{Item, StockError};
use stockscan_extraction::{build_provider, resolve_api_key, LabelExtractor};
use stockscan_inventory::{ConfirmationWorkflow, InventoryManager, Saved};
use stockscan_store::{FileKvStore, KeyValueStore, SnapshotStore, API_KEY_KEY};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::prompt::{review_pending, Review};
use crate::terminal_output::{note_info, note_success, note_warn, short_id, supports_color};

pub struct App {
    pub settings: Settings,
    pub kv: Arc<dyn KeyValueStore>,
    pub inventory: InventoryManager,
    pub workflow: ConfirmationWorkflow,
    pub color: bool,
}

impl App {
    pub async fn open(settings: Settings) -> Self {
        debug!(
            config = %settings.config_path.display(),
            data_dir = %settings.data_dir.display(),
            provider = ?settings.provider,
            "Opening inventory"
        );
        let kv: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::new(&settings.data_dir));
        let store = SnapshotStore::new(kv.clone()).with_key(settings.snapshot_key.clone());
        let inventory = InventoryManager::load(store).await;
        Self {
            settings,
            kv,
            inventory,
            workflow: ConfirmationWorkflow::new(),
            color: supports_color(),
        }
    }

    /// The key saved with `key set`, if readable.
    pub async fn stored_api_key(&self) -> Option<String> {
        match self.kv.get(API_KEY_KEY).await {
            Ok(key) => key,
            Err(e) => {
                warn!(error = %e, "Failed to read saved API key");
                None
            }
        }
    }

    /// Build the label extractor for the configured provider.
    pub async fn extractor(&self) -> Result<LabelExtractor> {
        let stored = self.stored_api_key().await;
        let key = resolve_api_key(stored.as_deref(), self.settings.configured_api_key.as_deref());
        let provider = build_provider(&self.settings.provider_settings(key)).map_err(|e| match e {
            StockError::MissingApiKey => anyhow!(
                "{e}: save one with `stockscan key set <KEY>` or set GEMINI_API_KEY"
            ),
            other => other.into(),
        })?;

        let mut extractor = LabelExtractor::new(provider, self.settings.model.clone());
        if let Some(text) = &self.settings.system_instruction {
            extractor = extractor.with_system_instruction(text.clone());
        }
        if let Some(text) = &self.settings.prompt {
            extractor = extractor.with_prompt(text.clone());
        }
        Ok(extractor)
    }

    /// Find an item by exact id or unique id prefix.
    pub fn resolve_id(&self, raw: &str) -> Result<Option<String>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        if self.inventory.get(raw).is_some() {
            return Ok(Some(raw.to_string()));
        }
        let matches: Vec<&Item> = self
            .inventory
            .items()
            .iter()
            .filter(|item| item.id.starts_with(raw))
            .collect();
        match matches.as_slice() {
            [] => Ok(None),
            [one] => Ok(Some(one.id.clone())),
            many => bail!("id prefix {raw:?} matches {} items", many.len()),
        }
    }

    /// Apply overrides to the pending item, let the user review it unless
    /// `skip_review`, then save or discard it.
    pub async fn confirm_pending(
        &mut self,
        overrides: &[(String, String)],
        skip_review: bool,
    ) -> Result<()> {
        for (field, value) in overrides {
            if let Err(e) = self.workflow.set_named(field, value) {
                self.workflow.cancel();
                return Err(e.into());
            }
        }

        let choice = if skip_review {
            Review::Save
        } else {
            let stdin = io::stdin();
            review_pending(&mut self.workflow, &mut stdin.lock(), &mut io::stderr(), self.color)?
        };

        if choice == Review::Cancel {
            self.workflow.cancel();
            note_info("Discarded; inventory unchanged");
            return Ok(());
        }

        match self.workflow.save(&mut self.inventory).await {
            Ok(Saved::Added(item)) => {
                note_success(&format!(
                    "Added {} {} x{} ({})",
                    item.brand,
                    item.name,
                    item.quantity,
                    short_id(&item.id)
                ));
                Ok(())
            }
            Ok(Saved::Updated(item)) => {
                note_success(&format!("Updated {} ({})", item.name, short_id(&item.id)));
                Ok(())
            }
            Ok(Saved::Vanished { id }) => {
                note_warn(&format!("Item {id} no longer exists; nothing saved"));
                Ok(())
            }
            Err(e @ StockError::Storage(_)) => {
                note_warn("The change was applied but could not be written to disk");
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}
