use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use crate::persistence::PersistenceManager;
use crate::storage::SqliteStore;

/// A SQLite store in a temp directory that can be reopened to check durability.
pub struct StoreFixture {
    pub temp_dir: TempDir,
    pub db_path: PathBuf,
}

impl StoreFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("glab.db");
        println!("[FIXTURE] Store at {}", db_path.display());
        Self { temp_dir, db_path }
    }

    /// Open a fresh manager over the fixture database.
    pub fn manager(&self) -> Arc<PersistenceManager> {
        let store = SqliteStore::open(&self.db_path).expect("Failed to open store");
        Arc::new(PersistenceManager::new(Arc::new(store)))
    }
}

impl Drop for StoreFixture {
    fn drop(&mut self) {
        println!("[FIXTURE] Cleaning up {}", self.temp_dir.path().display());
    }
}
