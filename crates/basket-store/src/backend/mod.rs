//! # Storage Backends
//!
//! The key-value contract the cart store persists through, and its
//! implementations.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    KeyValueStore                                        │
//! │                                                                         │
//! │  CartStore ──► get(key)  ──► Option<String>   (hydration, once)        │
//! │            └─► set(key, value)                (after every mutation)   │
//! │                     │                                                   │
//! │          ┌──────────┴──────────┐                                        │
//! │          ▼                     ▼                                        │
//! │   MemoryKvStore          SqliteKvStore                                  │
//! │   (tests, ephemeral)     (kv_store table, survives restarts)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::StoreResult;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

/// Async string key-value storage.
///
/// `set` overwrites the whole value for a key; there are no partial writes
/// and no multi-key transactions.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key was never written.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Short backend name for log fields.
    fn backend_name(&self) -> &'static str;
}
