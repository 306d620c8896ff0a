//! # Domain Types
//!
//! Core types shared by the cart and its consumers.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    LineItem     │   │  ItemPosition   │   │   CartTotals    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (key)       │   │  Found(index)   │   │  item_count     │       │
//! │  │  title          │   │  Missing        │   │  total_quantity │       │
//! │  │  image_url      │   │                 │   │  subtotal       │       │
//! │  │  unit_price     │   │  Found(0) is a  │   │                 │       │
//! │  │  quantity ≥ 1   │   │  real position  │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::validation::{validate_item_id, validate_price, validate_quantity};

// =============================================================================
// Line Item
// =============================================================================

/// One product row in the cart.
///
/// `title` and `image_url` are display data owned by the catalog; the cart
/// stores them as given and never interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    /// Product identifier, unique within a cart.
    pub id: String,

    /// Display name.
    pub title: String,

    /// Display image reference.
    pub image_url: String,

    /// Price of one unit, in cents.
    pub unit_price: Money,

    /// Units of this product in the cart. Never zero while the row exists.
    pub quantity: u32,
}

impl LineItem {
    /// Builds a line item.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Self {
        LineItem {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            unit_price,
            quantity,
        }
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Checks the fields a cart row depends on.
    ///
    /// ## Rules
    /// - `id` non-empty
    /// - `unit_price` non-negative (zero is a free item)
    /// - `quantity` at least 1
    pub fn validate(&self) -> CoreResult<()> {
        validate_item_id(&self.id)?;
        validate_price(self.unit_price)?;
        validate_quantity(self.quantity)?;
        Ok(())
    }
}

// =============================================================================
// Item Position
// =============================================================================

/// Where a lookup by id landed.
///
/// Position 0 is `Found(0)`, a perfectly ordinary hit. Nothing in the cart
/// converts a position to a boolean, so the first row can't be mistaken
/// for "not in cart".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemPosition {
    /// The item sits at this index.
    Found(usize),
    /// No item with that id.
    Missing,
}

impl ItemPosition {
    /// Returns the index, if found.
    #[inline]
    pub const fn index(self) -> Option<usize> {
        match self {
            ItemPosition::Found(index) => Some(index),
            ItemPosition::Missing => None,
        }
    }

    #[inline]
    pub const fn is_found(self) -> bool {
        matches!(self, ItemPosition::Found(_))
    }
}

impl From<Option<usize>> for ItemPosition {
    fn from(index: Option<usize>) -> Self {
        index.map_or(ItemPosition::Missing, ItemPosition::Found)
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Summary figures for a cart, as the cart screen shows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    /// Distinct rows.
    #[ts(type = "number")]
    pub item_count: usize,

    /// Sum of all quantities.
    #[ts(type = "number")]
    pub total_quantity: u64,

    /// Sum of all line totals, in cents.
    pub subtotal: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
