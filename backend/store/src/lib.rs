//! Persistence for stockscan: a small key-value store and the inventory
//! snapshot kept inside it.

pub mod kv;
pub mod snapshot;

pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use snapshot::{SnapshotLoad, SnapshotStore, API_KEY_KEY, SNAPSHOT_KEY};
