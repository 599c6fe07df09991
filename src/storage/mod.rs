//! Storage layer for glab
//!
//! A flat string-to-string key-value space, the native stand-in for browser
//! local storage. Two backends: SQLite for durable state, memory for tests
//! and throwaway sessions.

pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;

/// Sentinel key written and deleted by [`KeyValueStore::probe`].
pub const PROBE_KEY: &str = "__glab_storage_probe__";

/// Raw key-value storage.
///
/// `set` must report an exhausted quota as [`crate::GlabError::QuotaExceeded`]
/// so callers can evict and retry.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;

    /// Check that the store accepts writes by writing and deleting a sentinel key.
    ///
    /// A full store still counts as available; expired records can be
    /// evicted to make room.
    fn probe(&self) -> bool {
        match self.set(PROBE_KEY, PROBE_KEY) {
            Ok(()) => self.remove(PROBE_KEY).is_ok(),
            Err(err) => err.is_quota(),
        }
    }
}
