//! Shared state for one CLI invocation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::backend::BackendClient;
use crate::cli::Cli;
use crate::config::Config;
use crate::error::Result;
use crate::persistence::{PersistenceManager, SaveOptions};
use crate::session::session_save_options;
use crate::storage::SqliteStore;

pub struct AppContext {
    pub config: Config,
    pub manager: Arc<PersistenceManager>,
    pub store_path: PathBuf,
    pub json: bool,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("store_path", &self.store_path)
            .field("json", &self.json)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = Config::load(cli.config.as_deref())?;
        if let Some(store) = &cli.store {
            config.storage.path = Some(store.clone());
        }
        Self::open(config, cli.json)
    }

    /// Open the SQLite store named by `config` and wrap it in a manager.
    pub fn open(config: Config, json: bool) -> Result<Self> {
        let store_path = config.storage.resolved_path()?;
        debug!(path = %store_path.display(), "opening store");
        let store = SqliteStore::open(&store_path)?.with_quota(config.storage.quota_bytes);
        let manager = Arc::new(PersistenceManager::with_capacity(
            Arc::new(store),
            config.storage.capacity_bytes,
        ));
        Ok(Self {
            config,
            manager,
            store_path,
            json,
        })
    }

    pub fn backend(&self) -> Result<BackendClient> {
        BackendClient::new(&self.config.backend)
    }

    /// Session save options with the configured debounce window.
    #[must_use]
    pub fn session_options(&self) -> SaveOptions {
        session_save_options()
            .with_save_delay(Duration::from_millis(self.config.persistence.save_delay_ms))
    }
}
