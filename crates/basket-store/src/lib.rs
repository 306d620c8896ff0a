//! # basket-store: Cart Store and Persistence for Basket
//!
//! Keeps the shopper's cart in memory and mirrors it into a key-value store
//! after every change, so the cart survives restarts.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Basket Data Flow                                 │
//! │                                                                         │
//! │  UI (product list, cart screen, checkout badge)                        │
//! │       │  session.cart()?.add_to_cart(item)                             │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   basket-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  CartSession  │───►│   CartStore   │───►│ KeyValueStore│  │   │
//! │  │   │ (session.rs)  │    │  (store.rs)   │    │  (backend/)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ open / close  │    │ hydrate once  │    │ Memory       │  │   │
//! │  │   │ Usage errors  │    │ mutate+persist│    │ Sqlite       │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │ Cart rules                    │   │
//! │  └────────────────────────────────┼────────────────────────────────┘   │
//! │                                   ▼                                     │
//! │                        basket-core (pure, no I/O)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`session`] - Session lifecycle, the consumer entry point
//! - [`store`] - `CartStore`: hydration, mutations, revisioned persistence
//! - [`backend`] - `KeyValueStore` contract and implementations
//! - [`pool`] / [`migrations`] - SQLite pool and embedded migrations
//! - [`config`] - `basket.toml` + `BASKET_*` environment overrides
//! - [`telemetry`] - tracing subscriber setup
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use basket_store::{BasketConfig, CartSession};
//!
//! let config = BasketConfig::load_or_default(None);
//! basket_store::telemetry::init_tracing(&config.logging)?;
//!
//! let mut session = CartSession::open_sqlite(&config).await?;
//! let cart = session.cart()?;
//! cart.add_to_cart(item).await?;
//! cart.increment("p1").await?;
//! let rows = cart.products().await;
//!
//! session.close().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod session;
pub mod store;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{KeyValueStore, MemoryKvStore, SqliteKvStore};
pub use config::{BasketConfig, LoggingSettings, StorageSettings};
pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use session::CartSession;
pub use store::CartStore;

// Core types consumers handle directly
pub use basket_core::{Cart, CartChange, CartTotals, LineItem, Money, CART_SNAPSHOT_KEY};
