//! Named configuration slots.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::overlay;
use crate::error::Result;
use crate::persistence::{PersistenceManager, SaveOptions, now_millis, to_plain};

pub const DEFAULT_MAX_CONFIGS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub timestamp: i64,
    pub data: Value,
}

/// A snapshot without its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigMeta {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub timestamp: i64,
}

/// Snapshots stored newest first under `multi_config_{name}`.
#[derive(Debug, Clone)]
pub struct ConfigSlots {
    manager: Arc<PersistenceManager>,
    storage_key: String,
    max_configs: usize,
}

impl ConfigSlots {
    pub fn new(manager: Arc<PersistenceManager>, config_key: &str) -> Self {
        Self::with_limit(manager, config_key, DEFAULT_MAX_CONFIGS)
    }

    pub fn with_limit(manager: Arc<PersistenceManager>, config_key: &str, max_configs: usize) -> Self {
        Self {
            manager,
            storage_key: format!("multi_config_{config_key}"),
            max_configs,
        }
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    fn snapshots(&self) -> Vec<ConfigSnapshot> {
        self.manager.load(&self.storage_key, None).unwrap_or_default()
    }

    fn store(&self, snapshots: &[ConfigSnapshot]) -> Result<()> {
        self.manager
            .save(&self.storage_key, snapshots, &SaveOptions::default())
    }

    /// Save `state` as `name`, replacing any snapshot with the same name.
    pub fn save<T: Serialize + ?Sized>(
        &self,
        name: &str,
        description: Option<&str>,
        state: &T,
    ) -> Result<()> {
        let mut snapshots = self.snapshots();
        snapshots.retain(|snapshot| snapshot.name != name);
        snapshots.insert(
            0,
            ConfigSnapshot {
                name: name.to_string(),
                description: description.map(str::to_string),
                timestamp: now_millis(),
                data: to_plain(state)?,
            },
        );
        snapshots.truncate(self.max_configs);
        debug!(key = %self.storage_key, name, count = snapshots.len(), "saved config");
        self.store(&snapshots)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<ConfigSnapshot> {
        self.snapshots()
            .into_iter()
            .find(|snapshot| snapshot.name == name)
    }

    /// Overlay the snapshot named `name` onto `state`.
    pub fn load_into<T: Serialize + DeserializeOwned>(&self, name: &str, state: &mut T) -> bool {
        self.get(name)
            .is_some_and(|snapshot| overlay(state, &snapshot.data))
    }

    #[must_use]
    pub fn list(&self) -> Vec<ConfigMeta> {
        self.snapshots()
            .into_iter()
            .map(|snapshot| ConfigMeta {
                name: snapshot.name,
                description: snapshot.description,
                timestamp: snapshot.timestamp,
            })
            .collect()
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let mut snapshots = self.snapshots();
        snapshots.retain(|snapshot| snapshot.name != name);
        self.store(&snapshots)
    }

    pub fn clear(&self) -> Result<()> {
        self.manager.remove(&self.storage_key)
    }
}
