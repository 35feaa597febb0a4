//! The confirmation workflow: one pending item at a time, reviewed and
//! edited before it reaches the inventory.

use stockscan_core::{now_millis, Item, ItemDraft, ItemField, StockError};
use tracing::{debug, info};

use crate::manager::InventoryManager;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PendingSlot {
    #[default]
    Empty,
    /// A candidate from a scan or manual entry.
    PendingNew(ItemDraft),
    /// An existing item opened for editing.
    PendingEdit { id: String, draft: ItemDraft },
}

impl PendingSlot {
    pub fn is_empty(&self) -> bool {
        matches!(self, PendingSlot::Empty)
    }

    pub fn draft(&self) -> Option<&ItemDraft> {
        match self {
            PendingSlot::Empty => None,
            PendingSlot::PendingNew(draft) | PendingSlot::PendingEdit { draft, .. } => Some(draft),
        }
    }

    fn draft_mut(&mut self) -> Option<&mut ItemDraft> {
        match self {
            PendingSlot::Empty => None,
            PendingSlot::PendingNew(draft) | PendingSlot::PendingEdit { draft, .. } => Some(draft),
        }
    }
}

/// What a save did to the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Saved {
    Added(Item),
    Updated(Item),
    /// The edited item was removed in the meantime; nothing changed.
    Vanished { id: String },
}

#[derive(Debug, Default)]
pub struct ConfirmationWorkflow {
    slot: PendingSlot,
}

impl ConfirmationWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self) -> &PendingSlot {
        &self.slot
    }

    pub fn is_pending(&self) -> bool {
        !self.slot.is_empty()
    }

    pub fn draft(&self) -> Option<&ItemDraft> {
        self.slot.draft()
    }

    /// Open a new candidate. Any id or timestamp it carries is dropped; both
    /// are assigned on save.
    pub fn begin_new(&mut self, mut draft: ItemDraft) -> Result<(), StockError> {
        self.ensure_empty()?;
        draft.id = None;
        draft.timestamp = None;
        debug!("Pending new item opened");
        self.slot = PendingSlot::PendingNew(draft);
        Ok(())
    }

    /// Open an existing item for editing.
    pub fn begin_edit(&mut self, item: &Item) -> Result<(), StockError> {
        self.ensure_empty()?;
        debug!(id = %item.id, "Pending edit opened");
        self.slot = PendingSlot::PendingEdit {
            id: item.id.clone(),
            draft: ItemDraft::from(item),
        };
        Ok(())
    }

    /// Change one field of the pending draft. Blank clears the field; on save
    /// it falls back to its default.
    pub fn set_field(&mut self, field: ItemField, value: &str) -> Result<(), StockError> {
        let draft = self.slot.draft_mut().ok_or(StockError::NoPendingItem)?;
        draft.set(field, value);
        Ok(())
    }

    /// [`Self::set_field`] with the field given by name.
    pub fn set_named(&mut self, name: &str, value: &str) -> Result<(), StockError> {
        let field: ItemField = name.parse()?;
        self.set_field(field, value)
    }

    /// Drop the pending item. Returns whether anything was pending.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.is_pending();
        if was_pending {
            debug!("Pending item discarded");
        }
        self.slot = PendingSlot::Empty;
        was_pending
    }

    /// Fill fallbacks, build the final item and hand it to the inventory. The
    /// slot is empty afterwards, even when persisting fails.
    pub async fn save(&mut self, inventory: &mut InventoryManager) -> Result<Saved, StockError> {
        match std::mem::take(&mut self.slot) {
            PendingSlot::Empty => Err(StockError::NoPendingItem),
            PendingSlot::PendingNew(draft) => {
                let item = draft.into_item(now_millis());
                info!(id = %item.id, name = %item.name, "Saving new item");
                inventory.add(item.clone()).await?;
                Ok(Saved::Added(item))
            }
            PendingSlot::PendingEdit { id, mut draft } => {
                draft.id = Some(id.clone());
                let item = draft.into_item(now_millis());
                if inventory.update(&id, item.clone()).await? {
                    info!(id = %id, "Saved edited item");
                    Ok(Saved::Updated(item))
                } else {
                    Ok(Saved::Vanished { id })
                }
            }
        }
    }

    fn ensure_empty(&self) -> Result<(), StockError> {
        if self.is_pending() {
            return Err(StockError::PendingSlotOccupied);
        }
        Ok(())
    }
}
