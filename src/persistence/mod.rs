//! Persistence manager
//!
//! Durable JSON state on top of a [`crate::storage::KeyValueStore`]:
//! - versioned record envelope with SHA-256 checksum
//! - TTL expiry, enforced on load and swept at startup / under quota pressure
//! - per-key migration chains
//! - debounced writes
//! - stats, export and import

pub mod debounce;
pub mod manager;
pub mod migration;
pub mod plain;
pub mod record;
pub mod stats;

pub use manager::{DEFAULT_SAVE_DELAY, DEFAULT_VERSION, LoadOutcome, PersistenceManager, SaveOptions};
pub use migration::{MigrationError, MigrationRegistry, MigrationStep};
pub use plain::{strip_internal_fields, to_plain};
pub use record::{StoredRecord, checksum, now_millis};
pub use stats::{DEFAULT_CAPACITY_BYTES, StorageItem, StorageStats};
