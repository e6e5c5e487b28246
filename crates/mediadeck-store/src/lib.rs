//! # mediadeck-store
//!
//! Snapshot persistence for the prompt history.
//!
//! The history itself lives in memory (`mediadeck_buffers::HistoryStack`);
//! this crate is the collaborator the host calls to load a snapshot at
//! startup and to save one after each change. [`JsonFileHistoryStore`] keeps
//! it in a JSON file under the platform data directory,
//! [`MemoryHistoryStore`] keeps it in memory.

pub mod history_store;

mod error;

pub use error::{Result, StoreError};
pub use history_store::{
    HistorySnapshot, HistorySnapshotStore, JsonFileHistoryStore, MemoryHistoryStore,
};
