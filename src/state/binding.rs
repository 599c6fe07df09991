use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::overlay;
use crate::error::{GlabError, Result};
use crate::persistence::{PersistenceManager, SaveOptions};

pub const DEFAULT_PREFIX: &str = "store";

type FieldFilter = Arc<dyn Fn(&str, &Value) -> bool + Send + Sync>;

/// How a binding selects and writes fields.
#[derive(Clone)]
pub struct BindingOptions {
    pub prefix: String,
    /// Fields to persist; empty means every field.
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Route [`StateBinding::save`] through the debouncer.
    pub auto_save: bool,
    pub save: SaveOptions,
    filter: Option<FieldFilter>,
}

impl std::fmt::Debug for BindingOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingOptions")
            .field("prefix", &self.prefix)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("auto_save", &self.auto_save)
            .field("save", &self.save)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

impl Default for BindingOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            include: Vec::new(),
            exclude: Vec::new(),
            auto_save: true,
            save: SaveOptions::default(),
            filter: None,
        }
    }
}

impl BindingOptions {
    #[must_use]
    pub fn include<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = auto_save;
        self
    }

    #[must_use]
    pub fn save_options(mut self, save: SaveOptions) -> Self {
        self.save = save;
        self
    }

    /// Extra predicate; a field is kept only when it returns true.
    #[must_use]
    pub fn filter(mut self, filter: impl Fn(&str, &Value) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    fn keeps(&self, field: &str, value: &Value) -> bool {
        !field.starts_with('$')
            && !self.exclude.iter().any(|excluded| excluded == field)
            && self.filter.as_ref().is_none_or(|filter| filter(field, value))
    }
}

/// Persists selected fields of one state struct under `{prefix}_{key}`.
#[derive(Debug, Clone)]
pub struct StateBinding {
    manager: Arc<PersistenceManager>,
    storage_key: String,
    options: BindingOptions,
}

impl StateBinding {
    pub fn new(manager: Arc<PersistenceManager>, key: &str, options: BindingOptions) -> Self {
        let key = if key.is_empty() { "default" } else { key };
        let storage_key = format!("{}_{key}", options.prefix);
        Self {
            manager,
            storage_key,
            options,
        }
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    #[must_use]
    pub const fn options(&self) -> &BindingOptions {
        &self.options
    }

    /// The persisted projection of `state`.
    pub fn snapshot<T: Serialize + ?Sized>(&self, state: &T) -> Result<Value> {
        let Value::Object(mut fields) = serde_json::to_value(state)? else {
            return Err(GlabError::InvalidInput(format!(
                "state bound to {} must serialize to an object",
                self.storage_key
            )));
        };

        let names: Vec<String> = if self.options.include.is_empty() {
            fields.keys().cloned().collect()
        } else {
            self.options.include.clone()
        };

        let mut selected = Map::new();
        for name in names {
            let Some(value) = fields.remove(&name) else {
                continue;
            };
            if self.options.keeps(&name, &value) {
                selected.insert(name, value);
            }
        }
        Ok(Value::Object(selected))
    }

    /// Persist `state`, debounced when auto-save is on and a delay is set.
    pub fn save<T: Serialize + ?Sized>(&self, state: &T) -> Result<()> {
        let snapshot = self.snapshot(state)?;
        if self.options.auto_save && !self.options.save.save_delay.is_zero() {
            self.manager
                .save_with_delay(&self.storage_key, &snapshot, &self.options.save)
        } else {
            self.manager.save(&self.storage_key, &snapshot, &self.options.save)
        }
    }

    /// Persist `state` now, bypassing the debouncer.
    pub fn force_save<T: Serialize + ?Sized>(&self, state: &T) -> Result<()> {
        let snapshot = self.snapshot(state)?;
        self.manager.save(&self.storage_key, &snapshot, &self.options.save)
    }

    /// Overlay stored fields onto `state`. Returns whether anything was loaded.
    pub fn load_into<T: Serialize + DeserializeOwned>(&self, state: &mut T) -> bool {
        let Some(stored) = self
            .manager
            .load_value(&self.storage_key, Some(&self.options.save.version))
        else {
            return false;
        };
        let loaded = overlay(state, &stored);
        if loaded {
            debug!(key = %self.storage_key, "restored state");
        } else {
            warn!(key = %self.storage_key, "stored state could not be applied");
        }
        loaded
    }

    pub fn clear(&self) -> Result<()> {
        self.manager.remove(&self.storage_key)
    }
}
