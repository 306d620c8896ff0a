//! # Cart Store
//!
//! Owns the authoritative in-memory cart and mirrors it into a
//! [`KeyValueStore`] after every change.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CartStore Lifecycle                                  │
//! │                                                                         │
//! │  open(backend, key)                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  hydrate (once) ── get(key) ──┬── Some(valid)   → install cart          │
//! │                               ├── Some(corrupt) → warn, empty cart      │
//! │                               ├── None          → empty cart            │
//! │                               └── Err           → warn, empty cart      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  add_to_cart / increment / decrement / clear                            │
//! │       │                                                                 │
//! │       ├── 1. lock cart, apply change, bump revision, encode snapshot    │
//! │       ├── 2. lock writer, then unlock cart                              │
//! │       └── 3. skip if a newer revision already landed, else              │
//! │              set(key, snapshot); on failure log, keep memory            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The cart sits behind a `tokio::sync::Mutex`, so two mutations never
//! interleave. Writes are serialized by a second mutex that remembers the
//! last persisted revision. It is always taken while the cart lock is still
//! held, so writes queue in revision order; a write carrying a revision no
//! newer than the one already stored is dropped regardless, so the stored
//! snapshot only moves forward.
//!
//! ## Closing
//! [`CartStore::close`] is called by the owning session. Once closed, every
//! mutation fails with `StoreError::Usage`, including those made through
//! handles obtained before the close.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use basket_core::{Cart, CartChange, CartTotals, LineItem};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::backend::KeyValueStore;
use crate::error::{StoreError, StoreResult};

/// Cart plus the revision of its latest change.
#[derive(Debug, Default)]
struct CartState {
    cart: Cart,
    revision: u64,
}

/// An encoded snapshot waiting to be written.
struct PendingWrite {
    revision: u64,
    snapshot: String,
}

/// The cart state manager.
///
/// Sole writer of the snapshot key. Share it as `Arc<CartStore>`; all
/// methods take `&self`.
pub struct CartStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    state: Mutex<CartState>,
    persisted_revision: Mutex<u64>,
    closed: AtomicBool,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("backend", &self.backend.backend_name())
            .field("key", &self.key)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Creates the store and hydrates it from `key`.
    ///
    /// Never fails: an unreadable or missing snapshot yields an empty cart.
    pub async fn open(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let cart = Self::hydrate(backend.as_ref(), &key).await;

        CartStore {
            backend,
            key,
            state: Mutex::new(CartState { cart, revision: 0 }),
            persisted_revision: Mutex::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Stops accepting mutations.
    ///
    /// Mutations accepted before the close have their writes landed by the
    /// time this returns.
    pub async fn close(&self) {
        {
            let _state = self.state.lock().await;
            self.closed.store(true, Ordering::SeqCst);
        }
        let _writer = self.persisted_revision.lock().await;
        debug!(key = %self.key, "Cart store closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn hydrate(backend: &dyn KeyValueStore, key: &str) -> Cart {
        let stored = match backend.get(key).await {
            Ok(stored) => stored,
            Err(e) => {
                let err = StoreError::Hydration(e.to_string());
                warn!(
                    key = %key,
                    backend = backend.backend_name(),
                    error = %err,
                    "Cart snapshot unreadable, starting empty"
                );
                return Cart::new();
            }
        };

        let Some(snapshot) = stored else {
            debug!(key = %key, "No stored cart, starting empty");
            return Cart::new();
        };

        match Cart::from_snapshot(&snapshot) {
            Ok(cart) => {
                info!(key = %key, items = cart.len(), "Cart hydrated");
                cart
            }
            Err(e) => {
                let err = StoreError::Hydration(e.to_string());
                warn!(key = %key, error = %err, "Discarding corrupt cart snapshot");
                Cart::new()
            }
        }
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    /// Current rows, in cart order. The returned vector is a copy.
    pub async fn products(&self) -> Vec<LineItem> {
        self.state.lock().await.cart.items().to_vec()
    }

    /// Copy of the row with this id.
    pub async fn find(&self, id: &str) -> Option<LineItem> {
        self.state.lock().await.cart.get(id).cloned()
    }

    pub async fn totals(&self) -> CartTotals {
        self.state.lock().await.cart.totals()
    }

    /// The storage key this store reads and writes.
    pub fn snapshot_key(&self) -> &str {
        &self.key
    }

    /// Revision of the latest in-memory change (0 = as hydrated).
    pub async fn revision(&self) -> u64 {
        self.state.lock().await.revision
    }

    /// Revision of the latest snapshot known to be stored.
    pub async fn persisted_revision(&self) -> u64 {
        *self.persisted_revision.lock().await
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a product, or bumps its quantity by one if it's already in the
    /// cart.
    ///
    /// ## Errors
    /// - `StoreError::Core` for an invalid item; the cart is left as it was
    /// - `StoreError::Usage` once the store is closed
    ///
    /// Storage failures are logged, never returned.
    pub async fn add_to_cart(&self, item: LineItem) -> StoreResult<CartChange> {
        let item_id = item.id.clone();
        let change = self.apply(|cart| Ok(cart.add(item)?)).await?;
        debug!(item_id = %item_id, ?change, "add_to_cart");
        Ok(change)
    }

    /// One more unit of `id`. Unknown ids are a no-op.
    pub async fn increment(&self, id: &str) -> StoreResult<CartChange> {
        let change = self.apply(|cart| Ok(cart.increment(id))).await?;
        debug!(item_id = %id, ?change, "increment");
        Ok(change)
    }

    /// One less unit of `id`; the row goes away at zero. Unknown ids are a
    /// no-op.
    pub async fn decrement(&self, id: &str) -> StoreResult<CartChange> {
        let change = self.apply(|cart| Ok(cart.decrement(id))).await?;
        debug!(item_id = %id, ?change, "decrement");
        Ok(change)
    }

    /// Empties the cart.
    pub async fn clear(&self) -> StoreResult<CartChange> {
        let change = self.apply(|cart| Ok(cart.clear())).await?;
        debug!(?change, "clear");
        Ok(change)
    }

    /// Runs one mutation under the cart lock, then persists outside it.
    async fn apply<F>(&self, f: F) -> StoreResult<CartChange>
    where
        F: FnOnce(&mut Cart) -> StoreResult<CartChange>,
    {
        let (change, write, mut persisted) = {
            let mut state = self.state.lock().await;
            if self.is_closed() {
                return Err(StoreError::usage(format!(
                    "cart '{}' mutated after its session closed",
                    self.key
                )));
            }

            let change = f(&mut state.cart)?;
            if !change.is_change() {
                return Ok(change);
            }

            state.revision += 1;
            let revision = state.revision;
            match state.cart.to_snapshot() {
                Ok(snapshot) => (
                    change,
                    PendingWrite { revision, snapshot },
                    self.persisted_revision.lock().await,
                ),
                Err(e) => {
                    let err = StoreError::Persistence(e.to_string());
                    error!(revision, error = %err, "Cart snapshot could not be encoded");
                    return Ok(change);
                }
            }
        };

        self.persist(&mut persisted, write).await;
        Ok(change)
    }

    /// Writes `write` unless `persisted` already holds a newer revision.
    async fn persist(&self, persisted: &mut u64, write: PendingWrite) {
        if write.revision <= *persisted {
            debug!(
                revision = write.revision,
                persisted = *persisted,
                "Newer snapshot already stored, skipping write"
            );
            return;
        }

        match self.backend.set(&self.key, &write.snapshot).await {
            Ok(()) => {
                *persisted = write.revision;
                debug!(key = %self.key, revision = write.revision, "Cart snapshot persisted");
            }
            Err(e) => {
                let err = StoreError::Persistence(e.to_string());
                error!(
                    key = %self.key,
                    backend = self.backend.backend_name(),
                    revision = write.revision,
                    error = %err,
                    "Cart snapshot not persisted, in-memory cart stays current"
                );
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
