//! Structured logging for stockscan.
//!
//! Console output for the operator, NDJSON files for later inspection, and
//! inventory audit events with secrets scrubbed.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, InventoryEvent, EVENT_TARGET};
pub use logger::{init_logger, LogOptions};
pub use redact::redact_sensitive_data;
