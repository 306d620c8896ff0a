//! # Database Pool Management
//!
//! SQLite connection pool for the persistent key-value backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Session startup                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.kv_store() ← SqliteKvStore over the shared pool                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartStore::open(backend, key)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! File databases run in WAL mode: readers don't block the snapshot writer
//! and a crash mid-write leaves the previous snapshot intact.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::backend::sqlite::SqliteKvStore;
use crate::error::{StoreError, StoreResult};
use crate::migrations;

/// Path value that selects a private in-memory database.
const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Pool settings for the SQLite backend. Built from `BasketConfig::db_config`.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,

    /// Pool size. Default 2: the cart writer plus one reader.
    pub max_connections: u32,

    /// Connections kept open while idle.
    pub min_connections: u32,

    /// How long to wait for a pooled connection.
    pub connect_timeout: Duration,

    /// Idle connections are closed after this long (file databases only).
    pub idle_timeout: Duration,

    /// Apply embedded migrations in `Database::new`.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Configuration for a database file, created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 2,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the pool size (`[storage] max_connections`).
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// A private in-memory database, used by tests.
    ///
    /// The database lives as long as its single pooled connection, so the
    /// pool is pinned to exactly one and that connection is never recycled.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
            ..DbConfig::new(IN_MEMORY_PATH)
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY_PATH)
    }

    /// Pool settings. In-memory pools never expire their connection.
    fn pool_options(&self) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout);

        if self.is_in_memory() {
            options.idle_timeout(None).max_lifetime(None)
        } else {
            options.idle_timeout(Some(self.idle_timeout))
        }
    }

    fn connect_options(&self) -> StoreResult<SqliteConnectOptions> {
        if self.is_in_memory() {
            return SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StoreError::ConnectionFailed(e.to_string()));
        }

        let options = SqliteConnectOptions::new()
            .filename(&self.database_path)
            .journal_mode(SqliteJournalMode::Wal)
            // NORMAL: safe from corruption, may lose the last write on power loss
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        Ok(options)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Database handle; cheap to clone (the pool is reference-counted).
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file (and parent directory) if missing
    /// 2. Configures WAL + NORMAL synchronous for file databases
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        if !config.is_in_memory() {
            if let Some(parent) = config.database_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;
                }
            }
        }

        let connect_options = config.connect_options()?;
        debug!("Connection options configured");

        let pool = config
            .pool_options()
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Idempotent.
    pub async fn run_migrations(&self) -> StoreResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the key-value backend over this pool.
    pub fn kv_store(&self) -> SqliteKvStore {
        SqliteKvStore::new(self.pool.clone())
    }

    /// Closes the pool. Backends created from it fail afterwards.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_closed_database_is_unhealthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }

    #[tokio::test]
    async fn test_file_database_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("basket.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert!(db.health_check().await);
        assert!(path.exists());
        db.close().await;
    }

    #[test]
    fn test_config_builder() {
        let mut config = DbConfig::new("/tmp/test.db").max_connections(10);
        config.run_migrations = false;

        assert_eq!(config.max_connections, 10);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[test]
    fn test_in_memory_connection_is_never_recycled() {
        let options = DbConfig::in_memory().pool_options();
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);
        assert_eq!(options.get_max_connections(), 1);

        let file = DbConfig::new("/tmp/test.db").pool_options();
        assert_eq!(file.get_idle_timeout(), Some(Duration::from_secs(600)));
    }
}
