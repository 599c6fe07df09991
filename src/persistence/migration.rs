//! Per-key version migration chains.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;

use crate::error::Result;

type MigrateFn = dyn Fn(Value) -> Result<Value> + Send + Sync;

/// One `from -> to` payload transform.
pub struct MigrationStep {
    pub from: String,
    pub to: String,
    migrate: Box<MigrateFn>,
}

impl std::fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationStep")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

impl MigrationStep {
    /// A step whose transform may fail.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        migrate: impl Fn(Value) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            migrate: Box::new(migrate),
        }
    }

    /// A step whose transform always succeeds.
    pub fn map(
        from: impl Into<String>,
        to: impl Into<String>,
        migrate: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self::new(from, to, move |data| Ok(migrate(data)))
    }

    pub fn apply(&self, data: Value) -> Result<Value> {
        (self.migrate)(data)
    }
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("no migration path from {at} to {target}")]
    NoPath { at: String, target: String },

    #[error("step {from} -> {to} failed: {source}")]
    StepFailed {
        from: String,
        to: String,
        #[source]
        source: crate::GlabError,
    },
}

/// Migration chains keyed by storage key. Registration order is chain order.
#[derive(Debug, Default)]
pub struct MigrationRegistry {
    chains: RwLock<HashMap<String, Vec<Arc<MigrationStep>>>>,
}

impl MigrationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, key: &str, step: MigrationStep) {
        self.chains
            .write()
            .entry(key.to_string())
            .or_default()
            .push(Arc::new(step));
    }

    /// Number of steps registered for `key`.
    #[must_use]
    pub fn len(&self, key: &str) -> usize {
        self.chains.read().get(key).map_or(0, Vec::len)
    }

    /// Walk the chain from `from` until `to` is reached.
    ///
    /// At each hop the first step whose `from` equals the current version is
    /// applied. The number of hops is bounded by the chain length, so a cycle
    /// ends as `NoPath`.
    pub fn migrate(
        &self,
        key: &str,
        data: Value,
        from: &str,
        to: &str,
    ) -> std::result::Result<Value, MigrationError> {
        // Snapshot so user transforms never run under the lock.
        let steps: Vec<Arc<MigrationStep>> =
            self.chains.read().get(key).cloned().unwrap_or_default();

        let mut current = from.to_string();
        let mut data = data;
        let mut hops = 0;

        while current != to {
            let step = if hops < steps.len() {
                steps.iter().find(|step| step.from == current)
            } else {
                None
            };
            let Some(step) = step else {
                return Err(MigrationError::NoPath {
                    at: current,
                    target: to.to_string(),
                });
            };

            data = step
                .apply(data)
                .map_err(|source| MigrationError::StepFailed {
                    from: step.from.clone(),
                    to: step.to.clone(),
                    source,
                })?;
            tracing::debug!(key, from = %step.from, to = %step.to, "applied migration step");
            current.clone_from(&step.to);
            hops += 1;
        }

        Ok(data)
    }
}
