//! # SQLite Key-Value Backend
//!
//! Stores values in the `kv_store` table (see `migrations/sqlite`).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  kv_store                                                               │
//! │                                                                         │
//! │  key (PK)                  │ value                  │ updated_at        │
//! │  ──────────────────────────┼────────────────────────┼─────────────────  │
//! │  @GoMarketplace:products   │ [{"id":"p1",...}]      │ 2026-10-19T...    │
//! │                                                                         │
//! │  set() = INSERT ... ON CONFLICT(key) DO UPDATE                          │
//! │  One statement, so a write either lands whole or not at all.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use super::KeyValueStore;
use crate::error::StoreResult;

/// Key-value backend over a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    /// Creates a new SqliteKvStore. The `kv_store` table must exist.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteKvStore { pool }
    }

    /// When the key was last written.
    pub async fn updated_at(&self, key: &str) -> StoreResult<Option<DateTime<Utc>>> {
        let stamp = sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT updated_at FROM kv_store WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stamp)
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let now = Utc::now();

        debug!(key = %key, bytes = value.len(), "Writing key-value entry");

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
