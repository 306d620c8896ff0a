//! # Cart Session
//!
//! The only way consumers reach a [`CartStore`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session States                                       │
//! │                                                                         │
//! │   inactive() ───────────────────────────┐                               │
//! │                                         ▼                               │
//! │   open(..) / open_sqlite(..) ──► ACTIVE ──close()──► CLOSED             │
//! │                                   │                    │                │
//! │                       cart() → Arc<CartStore>    cart() → Usage error   │
//! │                                                  old handle mutation    │
//! │                                                    → Usage error        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Closing a session closes its store: a `CartStore` handle kept past
//! [`CartSession::close`] can still be read but every mutation through it
//! fails with `StoreError::Usage`. A session opened with
//! [`CartSession::open_sqlite`] also owns its database pool and closes it.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::backend::KeyValueStore;
use crate::config::BasketConfig;
use crate::error::{StoreError, StoreResult};
use crate::pool::Database;
use crate::store::CartStore;

/// Owner of one cart store for the lifetime of a user session.
#[derive(Debug)]
pub struct CartSession {
    id: Uuid,
    store: Option<Arc<CartStore>>,
    database: Option<Database>,
}

impl CartSession {
    /// Opens a session over `backend`, hydrating the cart from the
    /// configured snapshot key.
    pub async fn open(
        backend: Arc<dyn KeyValueStore>,
        config: &BasketConfig,
    ) -> StoreResult<Self> {
        config.validate()?;

        let id = Uuid::new_v4();
        let backend_name = backend.backend_name();
        let store = CartStore::open(backend, config.snapshot_key()).await;

        info!(
            session_id = %id,
            backend = backend_name,
            key = %store.snapshot_key(),
            "Cart session opened"
        );

        Ok(CartSession {
            id,
            store: Some(Arc::new(store)),
            database: None,
        })
    }

    /// Opens a session on the configured SQLite file.
    pub async fn open_sqlite(config: &BasketConfig) -> StoreResult<Self> {
        config.validate()?;

        let database = Database::new(config.db_config()?).await?;
        let backend: Arc<dyn KeyValueStore> = Arc::new(database.kv_store());

        let mut session = Self::open(backend, config).await?;
        session.database = Some(database);
        Ok(session)
    }

    /// A session with no cart behind it.
    pub fn inactive() -> Self {
        CartSession {
            id: Uuid::new_v4(),
            store: None,
            database: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.store.is_some()
    }

    /// Shared handle to the cart.
    ///
    /// ## Errors
    /// `StoreError::Usage` if the session was never opened or has been
    /// closed.
    pub fn cart(&self) -> StoreResult<Arc<CartStore>> {
        self.store.clone().ok_or_else(|| {
            StoreError::usage(format!(
                "cart used outside an active session (session {})",
                self.id
            ))
        })
    }

    /// Ends the session.
    ///
    /// The store is closed first, so handles still held elsewhere get
    /// `StoreError::Usage` on their next mutation. Owned database pools are
    /// closed after that; the stored snapshot stays for the next session.
    pub async fn close(&mut self) {
        let store = self.store.take();
        if let Some(ref store) = store {
            store.close().await;
        }

        if let Some(database) = self.database.take() {
            database.close().await;
        }

        if store.is_some() {
            info!(session_id = %self.id, "Cart session closed");
        }
    }
}

impl Default for CartSession {
    fn default() -> Self {
        Self::inactive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryKvStore;
    use basket_core::{CartChange, LineItem, Money};

    fn item(id: &str) -> LineItem {
        LineItem::new(id, "Tee", "https://img.example/tee.png", Money::from_cents(1990), 1)
    }

    #[tokio::test]
    async fn test_inactive_session_is_usage_error() {
        let session = CartSession::default();
        assert!(!session.is_active());

        let err = session.cart().unwrap_err();
        assert!(err.is_usage());
    }

    #[tokio::test]
    async fn test_closed_session_is_usage_error() {
        crate::telemetry::try_init_tracing();
        let backend = Arc::new(MemoryKvStore::new());
        let mut session = CartSession::open(backend, &BasketConfig::default())
            .await
            .unwrap();

        let cart = session.cart().unwrap();
        assert_eq!(cart.add_to_cart(item("p1")).await.unwrap(), CartChange::Added);
        assert!(session.is_active());

        session.close().await;
        assert!(!session.is_active());
        assert!(matches!(session.cart(), Err(StoreError::Usage(_))));

        // Closing twice is fine.
        session.close().await;
    }

    #[tokio::test]
    async fn test_session_uses_configured_key() {
        let backend = Arc::new(MemoryKvStore::new());
        let mut config = BasketConfig::default();
        config.storage.snapshot_key = "shop:cart".to_string();

        let session = CartSession::open(backend.clone(), &config).await.unwrap();
        session.cart().unwrap().add_to_cart(item("p1")).await.unwrap();

        assert!(backend.get("shop:cart").await.unwrap().is_some());
        assert!(backend
            .get(basket_core::CART_SNAPSHOT_KEY)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let mut config = BasketConfig::default();
        config.storage.snapshot_key = String::new();

        let result = CartSession::open(Arc::new(MemoryKvStore::new()), &config).await;
        assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_sqlite_session_survives_restart() {
        crate::telemetry::try_init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let mut config = BasketConfig::default();
        config.storage.database_path = Some(dir.path().join("basket.db"));

        let mut first = CartSession::open_sqlite(&config).await.unwrap();
        let cart = first.cart().unwrap();
        cart.add_to_cart(item("p1")).await.unwrap();
        cart.add_to_cart(item("p2")).await.unwrap();
        cart.increment("p2").await.unwrap();
        drop(cart);
        first.close().await;

        let mut second = CartSession::open_sqlite(&config).await.unwrap();
        assert_ne!(first.id(), second.id());

        let rows = second.cart().unwrap().products().await;
        let rows: Vec<(&str, u32)> = rows.iter().map(|i| (i.id.as_str(), i.quantity)).collect();
        assert_eq!(rows, vec![("p1", 1), ("p2", 2)]);

        second.close().await;
    }

    #[tokio::test]
    async fn test_retained_handle_cannot_mutate_after_close() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = BasketConfig::default();
        config.storage.database_path = Some(dir.path().join("basket.db"));

        let mut session = CartSession::open_sqlite(&config).await.unwrap();
        let cart = session.cart().unwrap();
        cart.add_to_cart(item("p1")).await.unwrap();
        session.close().await;

        let err = cart.add_to_cart(item("p2")).await.unwrap_err();
        assert!(matches!(err, StoreError::Usage(_)));
        assert!(cart.increment("p1").await.unwrap_err().is_usage());
        assert_eq!(cart.products().await.len(), 1);

        // What was accepted before close is what the next session sees.
        let mut reopened = CartSession::open_sqlite(&config).await.unwrap();
        let rows = reopened.cart().unwrap().products().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "p1");
        reopened.close().await;
    }
}
