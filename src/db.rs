//! SQLite pool for diagnoses and cached summaries.

use anyhow::{Context, Result};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::time::Duration;

use crate::config::Config;

const MAX_CONNECTIONS: u32 = 5;

/// Concurrent requests may write summaries and diagnoses at the same time;
/// writers wait this long for the lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the database at `[db].path`, creating the file and its directory.
/// Foreign keys are enforced so deleting a diagnosis removes its subtree.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.db.path;

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    tracing::debug!(path = %db_path.display(), "connected to database");
    Ok(pool)
}
