//! Inventory Event Logger
//!
//! Audit events for every inventory mutation and failed extraction, written
//! through `tracing` so they land in the NDJSON file.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

/// Target that audit events are logged under.
pub const EVENT_TARGET: &str = "inventory_events";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum InventoryEvent {
    ItemAdded {
        id: String,
        name: String,
        quantity: u32,
    },
    ItemUpdated {
        id: String,
        name: String,
        quantity: u32,
    },
    ItemRemoved {
        id: String,
    },
    ExtractionFailed {
        provider: String,
        error_msg: String,
    },
}

impl InventoryEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            InventoryEvent::ItemAdded { .. } => "item_added",
            InventoryEvent::ItemUpdated { .. } => "item_updated",
            InventoryEvent::ItemRemoved { .. } => "item_removed",
            InventoryEvent::ExtractionFailed { .. } => "extraction_failed",
        }
    }

    fn redacted(mut self) -> Self {
        if let InventoryEvent::ExtractionFailed { error_msg, .. } = &mut self {
            *error_msg = redact_sensitive_data(error_msg);
        }
        self
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub timestamp: DateTime<Utc>,
    pub event: InventoryEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redact and emit one audit event. Returns the entry as logged.
    pub fn log_event(event: InventoryEvent) -> EventLogEntry {
        let entry = EventLogEntry {
            timestamp: Utc::now(),
            event: event.redacted(),
        };
        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: EVENT_TARGET, kind = entry.event.kind(), event = %json, "Inventory event");
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_failure_is_redacted() {
        let entry = EventLogger::log_event(InventoryEvent::ExtractionFailed {
            provider: "openai".into(),
            error_msg: "401 for Bearer abcdefghijklmnop".into(),
        });
        match entry.event {
            InventoryEvent::ExtractionFailed { error_msg, .. } => {
                assert!(!error_msg.contains("abcdefghijklmnop"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let json = serde_json::to_value(InventoryEvent::ItemRemoved { id: "x".into() }).unwrap();
        assert_eq!(json["type"], "ItemRemoved");
        assert_eq!(json["id"], "x");
    }
}
