//! # basket-core: Pure Cart Logic for Basket
//!
//! This crate holds the cart ledger itself: line items, the ordered cart,
//! id lookup and the snapshot format. It has zero I/O dependencies; the
//! storage side lives in `basket-store`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Basket Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     UI (cart screen)                            │   │
//! │  │        products() ◄──── reads     writes ───► add/inc/dec       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              basket-store (CartStore, CartSession)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ basket-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│   │   │
//! │  │   │ LineItem  │  │   Money   │  │   Cart    │  │   rules   │   │   │
//! │  │   │ Position  │  │           │  │ snapshot  │  │           │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - `LineItem`, `ItemPosition`, `CartTotals`
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - The ordered, id-unique `Cart` and its snapshot format
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use basket_core::{Cart, CartChange, LineItem, Money};
//!
//! let mut cart = Cart::new();
//! let item = LineItem::new("p1", "Coffee", "https://img/p1.png", Money::from_cents(1000), 1);
//!
//! assert_eq!(cart.add(item.clone()).unwrap(), CartChange::Added);
//! assert_eq!(cart.add(item).unwrap(), CartChange::Merged { quantity: 2 });
//! assert_eq!(cart.totals().subtotal.cents(), 2000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartChange};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::{CartTotals, ItemPosition, LineItem};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key the cart snapshot lives under.
///
/// Hydration and persistence both go through this one constant (or a
/// configured override of it), so a read can never look in a different
/// place than the last write.
pub const CART_SNAPSHOT_KEY: &str = "@GoMarketplace:products";

/// Maximum length of a line item id.
pub const MAX_ITEM_ID_LEN: usize = 128;
