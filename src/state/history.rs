//! Recent-state history.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::overlay;
use crate::error::Result;
use crate::persistence::{PersistenceManager, SaveOptions, now_millis, to_plain};

pub const DEFAULT_MAX_HISTORY: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: i64,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryMeta {
    pub id: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Entries stored newest first under `history_{name}`.
#[derive(Debug, Clone)]
pub struct History {
    manager: Arc<PersistenceManager>,
    storage_key: String,
    max_history: usize,
    enabled: bool,
}

impl History {
    pub fn new(manager: Arc<PersistenceManager>, history_key: &str) -> Self {
        Self {
            manager,
            storage_key: format!("history_{history_key}"),
            max_history: DEFAULT_MAX_HISTORY,
            enabled: true,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    /// A disabled history ignores [`History::add`].
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    fn entries(&self) -> Vec<HistoryEntry> {
        self.manager.load(&self.storage_key, None).unwrap_or_default()
    }

    /// Record `state`; returns the new entry id, or `None` when disabled.
    pub fn add<T: Serialize + ?Sized>(
        &self,
        state: &T,
        description: Option<&str>,
    ) -> Result<Option<String>> {
        if !self.enabled {
            return Ok(None);
        }

        let id = Uuid::new_v4().to_string();
        let mut entries = self.entries();
        entries.insert(
            0,
            HistoryEntry {
                id: id.clone(),
                timestamp: now_millis(),
                data: to_plain(state)?,
                description: description.map(str::to_string),
            },
        );
        entries.truncate(self.max_history);
        self.manager
            .save(&self.storage_key, &entries, &SaveOptions::default())?;
        Ok(Some(id))
    }

    #[must_use]
    pub fn list(&self) -> Vec<HistoryMeta> {
        self.entries()
            .into_iter()
            .map(|entry| HistoryMeta {
                id: entry.id,
                timestamp: entry.timestamp,
                description: entry.description,
            })
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<HistoryEntry> {
        self.entries().into_iter().find(|entry| entry.id == id)
    }

    pub fn restore_into<T: Serialize + DeserializeOwned>(&self, id: &str, state: &mut T) -> bool {
        self.get(id).is_some_and(|entry| overlay(state, &entry.data))
    }

    pub fn clear(&self) -> Result<()> {
        self.manager.remove(&self.storage_key)
    }
}
