//! Connection pool and schema for the address table.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{info, instrument};

use crate::config::Settings;

/// How long a connection waits for another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS addresses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        street TEXT NOT NULL,
        city TEXT NOT NULL,
        state TEXT NOT NULL,
        country TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS ix_addresses_street ON addresses (street)",
    "CREATE INDEX IF NOT EXISTS ix_addresses_latitude ON addresses (latitude)",
    "CREATE INDEX IF NOT EXISTS ix_addresses_longitude ON addresses (longitude)",
];

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Opens the pool described by `settings` and makes sure the schema exists.
///
/// An in-memory database lives inside a single connection, so the pool is
/// capped at one connection and never recycles it. File databases run in WAL
/// mode so readers never block the single writer.
#[instrument(skip(settings), fields(database_url = %settings.database_url))]
pub async fn connect(settings: &Settings) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&settings.database_url)?.create_if_missing(true);

    let pool = if is_in_memory(&settings.database_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(options.journal_mode(SqliteJournalMode::Wal).busy_timeout(BUSY_TIMEOUT))
            .await?
    };

    migrate(&pool).await?;
    info!("Address store ready");
    Ok(pool)
}

/// Idempotent schema setup.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await
}
