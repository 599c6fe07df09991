//! Schema migrations for the SQLite key-value store
//!
//! The schema version lives in `PRAGMA user_version`. Each step runs in its
//! own transaction together with the version bump, so an interrupted upgrade
//! leaves the file at the last complete version.

use rusqlite::Connection;

use crate::error::{GlabError, Result};

const MIGRATIONS: [&str; 2] = [
    include_str!("../../migrations/001_kv_entries.sql"),
    include_str!("../../migrations/002_kv_updated_index.sql"),
];

pub const SCHEMA_VERSION: u32 = MIGRATIONS.len() as u32;

/// Columns the store reads and writes.
const KV_COLUMNS: [&str; 3] = ["key", "value", "updated_at"];

/// Bring the database up to [`SCHEMA_VERSION`] and check the table layout.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    let version = apply(conn, &MIGRATIONS)?;
    verify_kv_table(conn)?;
    Ok(version)
}

fn user_version(conn: &Connection) -> Result<u32> {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(|err| GlabError::StorageUnavailable(format!("read user_version: {err}")))
}

fn apply(conn: &Connection, steps: &[&str]) -> Result<u32> {
    let latest = steps.len() as u32;
    let current = user_version(conn)?;
    if current > latest {
        return Err(GlabError::StorageUnavailable(format!(
            "store schema version {current} is newer than supported version {latest}"
        )));
    }

    for (idx, sql) in steps.iter().enumerate().skip(current as usize) {
        let target = (idx + 1) as u32;
        let tx = conn.unchecked_transaction().map_err(|err| {
            GlabError::StorageUnavailable(format!("begin migration {target}: {err}"))
        })?;
        tx.execute_batch(sql).map_err(|err| {
            GlabError::StorageUnavailable(format!("migration {target} failed: {err}"))
        })?;
        tx.pragma_update(None, "user_version", target).map_err(|err| {
            GlabError::StorageUnavailable(format!("set user_version {target}: {err}"))
        })?;
        tx.commit().map_err(|err| {
            GlabError::StorageUnavailable(format!("commit migration {target}: {err}"))
        })?;
        tracing::debug!(version = target, "applied store migration");
    }

    Ok(latest)
}

fn verify_kv_table(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('kv_entries')")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let missing: Vec<&str> = KV_COLUMNS
        .iter()
        .copied()
        .filter(|column| !columns.iter().any(|found| found == column))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(GlabError::StorageUnavailable(format!(
            "kv_entries is missing columns: {}",
            missing.join(", ")
        )))
    }
}
