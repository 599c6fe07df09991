//! The persistence manager.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::debounce::{Debouncer, PendingWrite};
use super::migration::{MigrationError, MigrationRegistry, MigrationStep};
use super::record::{StoredRecord, now_millis};
use super::stats::{DEFAULT_CAPACITY_BYTES, StorageItem, StorageStats};
use crate::error::{GlabError, Result};
use crate::storage::KeyValueStore;

pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(500);

/// Per-save settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    pub version: String,
    pub ttl: Option<Duration>,
    /// Quiet period for [`PersistenceManager::save_with_delay`]; zero writes immediately.
    pub save_delay: Duration,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            ttl: None,
            save_delay: DEFAULT_SAVE_DELAY,
        }
    }
}

impl SaveOptions {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// A zero `ttl` clears the expiry.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = (!ttl.is_zero()).then_some(ttl);
        self
    }

    #[must_use]
    pub fn with_save_delay(mut self, save_delay: Duration) -> Self {
        self.save_delay = save_delay;
        self
    }
}

/// Result of a load, including the reason a value was not returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded {
        data: Value,
        version: String,
        migrated_from: Option<String>,
    },
    Missing,
    Unavailable,
    /// Unparsable value; the key was deleted.
    Corrupt { reason: String },
    /// Past `expiresAt`; the key was deleted.
    Expired,
    /// Payload does not match its checksum; the key was deleted.
    ChecksumMismatch,
    /// No chain leads to the requested version; the key was deleted.
    NoMigrationPath { from: String, to: String },
    /// A migration step returned an error; the key was deleted.
    MigrationFailed { reason: String },
}

impl LoadOutcome {
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Loaded { data, .. } => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Loaded { .. } => "loaded",
            Self::Missing => "missing",
            Self::Unavailable => "unavailable",
            Self::Corrupt { .. } => "corrupt",
            Self::Expired => "expired",
            Self::ChecksumMismatch => "checksum_mismatch",
            Self::NoMigrationPath { .. } => "no_migration_path",
            Self::MigrationFailed { .. } => "migration_failed",
        }
    }
}

struct Core {
    store: Arc<dyn KeyValueStore>,
    available: bool,
    migrations: MigrationRegistry,
    capacity_bytes: u64,
}

impl Core {
    fn ensure_available(&self) -> Result<()> {
        if self.available {
            Ok(())
        } else {
            Err(GlabError::StorageUnavailable(
                "storage probe failed at startup".to_string(),
            ))
        }
    }

    fn save_value(&self, key: &str, data: Value, options: &SaveOptions) -> Result<()> {
        let record = StoredRecord::new(data, &options.version, options.ttl, now_millis());
        self.write_record(key, &record)
    }

    /// Write a record, evicting expired entries and retrying once on quota errors.
    fn write_record(&self, key: &str, record: &StoredRecord) -> Result<()> {
        self.ensure_available()?;
        let serialized = serde_json::to_string(record)?;

        match self.store.set(key, &serialized) {
            Ok(()) => {
                debug!(key, bytes = serialized.len(), version = %record.version, "saved record");
                Ok(())
            }
            Err(err) if err.is_quota() => {
                warn!(key, error = %err, "storage quota exceeded; evicting expired entries");
                let evicted = self.cleanup_expired();
                debug!(key, evicted, "retrying save after eviction");
                self.store.set(key, &serialized).inspect_err(|err| {
                    warn!(key, error = %err, "save failed after eviction");
                })
            }
            Err(err) => {
                warn!(key, error = %err, "save failed");
                Err(err)
            }
        }
    }

    fn discard(&self, key: &str) {
        if let Err(err) = self.store.remove(key) {
            warn!(key, error = %err, "failed to delete rejected record");
        }
    }

    fn cleanup_expired(&self) -> usize {
        if !self.available {
            return 0;
        }
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(err) => {
                warn!(error = %err, "failed to list keys for expiry sweep");
                return 0;
            }
        };

        let now = now_millis();
        let mut removed = 0;
        for key in keys {
            let Ok(Some(raw)) = self.store.get(&key) else {
                continue;
            };
            // Values that are not records are left alone.
            let Ok(record) = serde_json::from_str::<StoredRecord>(&raw) else {
                continue;
            };
            if record.is_expired(now) && self.store.remove(&key).is_ok() {
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, "removed expired records");
        }
        removed
    }
}

/// Versioned, checksummed, expiring JSON storage over a [`KeyValueStore`].
///
/// Construct one per process and share it by reference. Availability is
/// probed once at construction; when the probe fails every operation
/// reports failure instead of touching the store.
pub struct PersistenceManager {
    core: Arc<Core>,
    debouncer: OnceLock<Debouncer>,
}

impl std::fmt::Debug for PersistenceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceManager")
            .field("available", &self.core.available)
            .field("capacity_bytes", &self.core.capacity_bytes)
            .finish_non_exhaustive()
    }
}

impl PersistenceManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_capacity(store, DEFAULT_CAPACITY_BYTES)
    }

    /// Like [`Self::new`], reporting `capacity_bytes` as the nominal capacity in stats.
    pub fn with_capacity(store: Arc<dyn KeyValueStore>, capacity_bytes: u64) -> Self {
        let available = store.probe();
        if !available {
            warn!("storage is not available; persistence disabled");
        }

        let manager = Self {
            core: Arc::new(Core {
                store,
                available,
                migrations: MigrationRegistry::new(),
                capacity_bytes,
            }),
            debouncer: OnceLock::new(),
        };
        manager.core.cleanup_expired();
        manager
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.core.available
    }

    #[must_use]
    pub fn capacity_bytes(&self) -> u64 {
        self.core.capacity_bytes
    }

    /// Serialize `data` into a record and write it now.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, data: &T, options: &SaveOptions) -> Result<()> {
        self.core.ensure_available()?;
        let data = serde_json::to_value(data)?;
        self.core.save_value(key, data, options)
    }

    /// Debounced save: only the last call for `key` within `options.save_delay`
    /// of quiet is written. `data` is captured at call time.
    pub fn save_with_delay<T: Serialize + ?Sized>(
        &self,
        key: &str,
        data: &T,
        options: &SaveOptions,
    ) -> Result<()> {
        self.core.ensure_available()?;
        let data = serde_json::to_value(data)?;
        if options.save_delay.is_zero() {
            return self.core.save_value(key, data, options);
        }

        let debouncer = self.debouncer.get_or_init(|| {
            let core = Arc::clone(&self.core);
            Debouncer::spawn(move |key, write: PendingWrite| {
                if let Err(err) = core.save_value(key, write.data, &write.options) {
                    warn!(key, error = %err, "debounced save failed");
                }
            })
        });
        debouncer.schedule(
            key,
            PendingWrite {
                data,
                options: options.clone(),
            },
            options.save_delay,
        );
        Ok(())
    }

    /// Write all pending debounced saves now.
    pub fn flush_pending(&self) {
        if let Some(debouncer) = self.debouncer.get() {
            debouncer.flush();
        }
    }

    /// Load and deserialize, or `None` when the record cannot be honored.
    pub fn load<T: DeserializeOwned>(&self, key: &str, expected_version: Option<&str>) -> Option<T> {
        let data = self.load_value(key, expected_version)?;
        match serde_json::from_value(data) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "stored payload does not match the requested type");
                None
            }
        }
    }

    pub fn load_value(&self, key: &str, expected_version: Option<&str>) -> Option<Value> {
        self.load_outcome(key, expected_version).into_value()
    }

    /// Load with the reason for any failure.
    pub fn load_outcome(&self, key: &str, expected_version: Option<&str>) -> LoadOutcome {
        if !self.core.available {
            return LoadOutcome::Unavailable;
        }

        let raw = match self.core.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadOutcome::Missing,
            Err(err) => {
                warn!(key, error = %err, "failed to read record");
                return LoadOutcome::Unavailable;
            }
        };

        let record: StoredRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(err) => {
                warn!(key, error = %err, "discarding unparsable record");
                self.core.discard(key);
                return LoadOutcome::Corrupt {
                    reason: err.to_string(),
                };
            }
        };

        let now = now_millis();
        if record.is_expired(now) {
            debug!(key, "discarding expired record");
            self.core.discard(key);
            return LoadOutcome::Expired;
        }

        if !record.checksum_matches() {
            warn!(key, "data corruption detected; discarding record");
            self.core.discard(key);
            return LoadOutcome::ChecksumMismatch;
        }

        let target = match expected_version {
            Some(target) if target != record.version => target,
            _ => {
                return LoadOutcome::Loaded {
                    data: record.data,
                    version: record.version,
                    migrated_from: None,
                };
            }
        };

        let from = record.version.clone();
        match self
            .core
            .migrations
            .migrate(key, record.data, &record.version, target)
        {
            Ok(data) => {
                let migrated = StoredRecord::with_expiry(data, target, record.expires_at, now);
                if let Err(err) = self.core.write_record(key, &migrated) {
                    warn!(key, error = %err, "failed to persist migrated record");
                }
                info!(key, from = %from, to = target, "migrated record");
                LoadOutcome::Loaded {
                    data: migrated.data,
                    version: migrated.version,
                    migrated_from: Some(from),
                }
            }
            Err(MigrationError::NoPath { at, target: to }) => {
                warn!(key, from = %from, stopped_at = %at, to = %to, "no migration path; discarding record");
                self.core.discard(key);
                LoadOutcome::NoMigrationPath { from, to }
            }
            Err(err @ MigrationError::StepFailed { .. }) => {
                warn!(key, error = %err, "migration failed; discarding record");
                self.core.discard(key);
                LoadOutcome::MigrationFailed {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Raw stored string, bypassing all checks.
    pub fn raw(&self, key: &str) -> Result<Option<String>> {
        self.core.ensure_available()?;
        self.core.store.get(key)
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        self.core.ensure_available()?;
        self.core.store.keys()
    }

    /// Delete `key`, dropping any debounced write still pending for it.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.core.ensure_available()?;
        if let Some(debouncer) = self.debouncer.get() {
            debouncer.cancel(key);
        }
        self.core.store.remove(key)
    }

    /// Delete every key, dropping all pending debounced writes.
    pub fn clear(&self) -> Result<()> {
        self.core.ensure_available()?;
        if let Some(debouncer) = self.debouncer.get() {
            debouncer.cancel_all();
        }
        self.core.store.clear()
    }

    /// Append a step to `key`'s migration chain.
    pub fn register_migration(&self, key: &str, step: MigrationStep) {
        self.core.migrations.register(key, step);
    }

    /// Delete every record past its expiry; returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        self.core.cleanup_expired()
    }

    #[must_use]
    pub fn storage_stats(&self) -> StorageStats {
        let capacity = self.core.capacity_bytes;
        if !self.core.available {
            return StorageStats::from_items(Vec::new(), capacity);
        }
        let keys = match self.core.store.keys() {
            Ok(keys) => keys,
            Err(err) => {
                warn!(error = %err, "failed to list keys for stats");
                return StorageStats::from_items(Vec::new(), capacity);
            }
        };

        let items = keys
            .into_iter()
            .filter_map(|key| {
                let raw = self.core.store.get(&key).ok().flatten()?;
                let timestamp = serde_json::from_str::<Value>(&raw)
                    .ok()
                    .and_then(|value| value.get("timestamp").and_then(Value::as_i64));
                Some(StorageItem {
                    key,
                    size: raw.len() as u64,
                    timestamp,
                })
            })
            .collect();
        StorageStats::from_items(items, capacity)
    }

    /// Pretty JSON object mapping each key to its raw stored string.
    /// Keys without a stored value are skipped.
    pub fn export_data(&self, keys: Option<&[String]>) -> Result<String> {
        self.core.ensure_available()?;
        let targets = match keys {
            Some(keys) => keys.to_vec(),
            None => self.core.store.keys()?,
        };

        let mut exported = Map::new();
        for key in targets {
            if let Some(raw) = self.core.store.get(&key)? {
                exported.insert(key, Value::String(raw));
            }
        }
        debug!(keys = exported.len(), "exported entries");
        Ok(serde_json::to_string_pretty(&Value::Object(exported))?)
    }

    /// Write every entry of an export blob back; returns the number of keys written.
    pub fn import_data(&self, json: &str) -> Result<usize> {
        self.core.ensure_available()?;
        let parsed: Value = serde_json::from_str(json)?;
        let Value::Object(entries) = parsed else {
            return Err(GlabError::InvalidInput(
                "import data must be a JSON object".to_string(),
            ));
        };

        let mut written = 0;
        for (key, value) in entries {
            let raw = match value {
                Value::String(raw) => raw,
                other => other.to_string(),
            };
            self.core.store.set(&key, &raw)?;
            written += 1;
        }
        info!(written, "imported entries");
        Ok(written)
    }
}
