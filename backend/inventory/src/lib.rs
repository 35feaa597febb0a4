//! Inventory state, the confirmation workflow, and the scan controller.
//!
//! All mutation goes through `&mut` borrows of [`InventoryManager`] and
//! [`ConfirmationWorkflow`]; nothing here is shared across tasks.

pub mod export;
pub mod manager;
pub mod scanner;
pub mod sort;
pub mod workflow;

pub use export::{to_csv_string, write_csv, CSV_HEADER};
pub use manager::{AlwaysConfirm, Confirm, InventoryManager};
pub use scanner::{ScanController, ScanDelays, ScanOutcome, ScanStatus, ScanTicket};
pub use sort::{SortDirection, SortKey, SortSpec};
pub use workflow::{ConfirmationWorkflow, PendingSlot, Saved};
