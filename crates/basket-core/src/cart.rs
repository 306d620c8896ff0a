//! # Cart
//!
//! The ordered, id-unique collection of line items, and the snapshot format
//! it is persisted in.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operation            Lookup result        Cart change                  │
//! │  ─────────            ─────────────        ───────────                  │
//! │                                                                         │
//! │  add(item) ─────────► Found(i) ──────────► items[i].qty += 1  (Merged)  │
//! │                  └──► Missing ───────────► items.push(item)   (Added)   │
//! │                                                                         │
//! │  increment(id) ─────► Found(i) ──────────► items[i].qty += 1            │
//! │                  └──► Missing ───────────► nothing            (Unchanged)│
//! │                                                                         │
//! │  decrement(id) ─────► Found(i), qty > 1 ─► items[i].qty -= 1            │
//! │                  ├──► Found(i), qty = 1 ─► items.remove(i)    (Removed) │
//! │                  └──► Missing ───────────► nothing            (Unchanged)│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Format
//! A JSON array of line items in cart order:
//! ```json
//! [{"id":"p1","title":"Coffee","imageUrl":"https://…","unitPrice":1000,"quantity":2}]
//! ```

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CartTotals, ItemPosition, LineItem};

// =============================================================================
// Cart Change
// =============================================================================

/// What a mutation did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new row was appended.
    Added,
    /// An existing row absorbed a re-add; `quantity` is the new count.
    Merged { quantity: u32 },
    /// Quantity went up; `quantity` is the new count.
    Incremented { quantity: u32 },
    /// Quantity went down but the row stays; `quantity` is the new count.
    Decremented { quantity: u32 },
    /// The row's last unit was taken out, so the row is gone.
    Removed,
    /// Every row was dropped.
    Cleared,
    /// Nothing happened (unknown id, or clearing an empty cart).
    Unchanged,
}

impl CartChange {
    /// True when the cart differs from before the call.
    #[inline]
    pub const fn is_change(self) -> bool {
        !matches!(self, CartChange::Unchanged)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `id` (re-adding the same product bumps its quantity)
/// - Every present item has quantity ≥ 1
/// - Order is insertion order
///
/// Items are only reachable through `&self`; every change goes through the
/// methods below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from existing rows, keeping their order.
    ///
    /// Fails if any row is invalid or two rows share an id.
    pub fn from_items(items: Vec<LineItem>) -> CoreResult<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            item.validate()?;
            if !seen.insert(item.id.as_str()) {
                return Err(ValidationError::Duplicate {
                    field: "id".to_string(),
                    value: item.id.clone(),
                }
                .into());
            }
        }

        Ok(Cart { items })
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Finds the row with this id.
    ///
    /// A linear scan: a session cart holds a handful of rows, so an index
    /// would cost more than it saves.
    pub fn position(&self, id: &str) -> ItemPosition {
        self.items.iter().position(|item| item.id == id).into()
    }

    /// Returns the row with this id.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.position(id).index().and_then(|index| self.items.get(index))
    }

    /// Rows in cart order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a product, or bumps its quantity by one if already present.
    ///
    /// ## Behavior
    /// - Already in cart: quantity + 1; the incoming title/image/price are
    ///   ignored, the row keeps what it was added with
    /// - Not in cart: appended with the quantity it carries
    ///
    /// ## Errors
    /// The incoming item is validated first; an invalid item leaves the
    /// cart untouched.
    pub fn add(&mut self, item: LineItem) -> CoreResult<CartChange> {
        item.validate()?;

        match self.position(&item.id) {
            ItemPosition::Found(index) => {
                let row = &mut self.items[index];
                row.quantity = row.quantity.saturating_add(1);
                Ok(CartChange::Merged {
                    quantity: row.quantity,
                })
            }
            ItemPosition::Missing => {
                self.items.push(item);
                Ok(CartChange::Added)
            }
        }
    }

    /// Adds one unit to an existing row. Unknown ids are ignored.
    pub fn increment(&mut self, id: &str) -> CartChange {
        match self.position(id) {
            ItemPosition::Found(index) => {
                let row = &mut self.items[index];
                row.quantity = row.quantity.saturating_add(1);
                CartChange::Incremented {
                    quantity: row.quantity,
                }
            }
            ItemPosition::Missing => CartChange::Unchanged,
        }
    }

    /// Takes one unit off an existing row, dropping the row at zero.
    /// Unknown ids are ignored.
    pub fn decrement(&mut self, id: &str) -> CartChange {
        match self.position(id) {
            ItemPosition::Found(index) => {
                if self.items[index].quantity <= 1 {
                    self.items.remove(index);
                    CartChange::Removed
                } else {
                    let row = &mut self.items[index];
                    row.quantity -= 1;
                    CartChange::Decremented {
                        quantity: row.quantity,
                    }
                }
            }
            ItemPosition::Missing => CartChange::Unchanged,
        }
    }

    /// Drops every row.
    pub fn clear(&mut self) -> CartChange {
        if self.items.is_empty() {
            return CartChange::Unchanged;
        }
        self.items.clear();
        CartChange::Cleared
    }

    // =========================================================================
    // Totals
    // =========================================================================

    /// Number of distinct rows.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of all line totals.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals {
            item_count: self.len(),
            total_quantity: self.total_quantity(),
            subtotal: self.subtotal(),
        }
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    /// Encodes the whole cart for storage.
    pub fn to_snapshot(&self) -> CoreResult<String> {
        serde_json::to_string(&self.items).map_err(|e| CoreError::Encode(e.to_string()))
    }

    /// Decodes a stored snapshot.
    ///
    /// Anything that doesn't parse, or parses into rows that break a cart
    /// invariant, is an `InvalidSnapshot`.
    pub fn from_snapshot(snapshot: &str) -> CoreResult<Self> {
        let items: Vec<LineItem> = serde_json::from_str(snapshot)
            .map_err(|e| CoreError::InvalidSnapshot(e.to_string()))?;

        Cart::from_items(items).map_err(|e| CoreError::InvalidSnapshot(e.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price_cents: i64) -> LineItem {
        LineItem::new(
            id,
            format!("Product {}", id),
            format!("https://img.example/{}.png", id),
            Money::from_cents(price_cents),
            1,
        )
    }

    #[test]
    fn test_distinct_adds_get_one_row_each() {
        let mut cart = Cart::new();
        cart.add(item("a", 100)).unwrap();
        cart.add(item("b", 200)).unwrap();
        cart.add(item("a", 100)).unwrap();
        cart.add(item("c", 300)).unwrap();
        cart.add(item("a", 100)).unwrap();

        let ids: Vec<&str> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(cart.get("a").unwrap().quantity, 3);
        assert_eq!(cart.get("b").unwrap().quantity, 1);
        assert_eq!(cart.get("c").unwrap().quantity, 1);
    }

    #[test]
    fn test_merge_first_row() {
        // The first row sits at index 0; it must still merge.
        let mut cart = Cart::new();
        assert_eq!(cart.add(item("p1", 1000)).unwrap(), CartChange::Added);
        assert_eq!(
            cart.add(item("p1", 1000)).unwrap(),
            CartChange::Merged { quantity: 2 }
        );
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_add_keeps_given_quantity_for_new_rows() {
        let mut cart = Cart::new();
        let mut bulk = item("p1", 100);
        bulk.quantity = 4;

        cart.add(bulk).unwrap();
        assert_eq!(cart.get("p1").unwrap().quantity, 4);
    }

    #[test]
    fn test_merge_keeps_original_display_fields() {
        let mut cart = Cart::new();
        cart.add(item("p1", 1000)).unwrap();

        let mut renamed = item("p1", 5000);
        renamed.title = "Renamed".to_string();
        cart.add(renamed).unwrap();

        let row = cart.get("p1").unwrap();
        assert_eq!(row.title, "Product p1");
        assert_eq!(row.unit_price.cents(), 1000);
    }

    #[test]
    fn test_invalid_add_leaves_cart_untouched() {
        let mut cart = Cart::new();
        cart.add(item("p1", 100)).unwrap();

        let mut bad = item("p2", 100);
        bad.quantity = 0;
        assert!(cart.add(bad).is_err());
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_increment_then_decrement_round_trips() {
        let mut cart = Cart::new();
        cart.add(item("p1", 100)).unwrap();
        cart.add(item("p1", 100)).unwrap();

        assert_eq!(cart.increment("p1"), CartChange::Incremented { quantity: 3 });
        assert_eq!(cart.decrement("p1"), CartChange::Decremented { quantity: 2 });
        assert_eq!(cart.get("p1").unwrap().quantity, 2);
    }

    #[test]
    fn test_decrement_to_zero_removes_and_does_not_resurrect() {
        let mut cart = Cart::new();
        cart.add(item("p1", 100)).unwrap();
        cart.add(item("p2", 100)).unwrap();

        assert_eq!(cart.decrement("p1"), CartChange::Removed);
        assert_eq!(cart.position("p1"), ItemPosition::Missing);

        assert_eq!(cart.increment("p1"), CartChange::Unchanged);
        assert!(cart.get("p1").is_none());
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut cart = Cart::new();
        cart.add(item("p1", 100)).unwrap();
        let before = cart.clone();

        assert_eq!(cart.increment("nope"), CartChange::Unchanged);
        assert_eq!(cart.decrement("nope"), CartChange::Unchanged);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_scenario() {
        let mut cart = Cart::new();
        cart.add(item("p1", 10)).unwrap();
        cart.add(item("p1", 10)).unwrap();
        cart.increment("p1");
        assert_eq!(cart.get("p1").unwrap().quantity, 3);

        cart.decrement("p1");
        cart.decrement("p1");
        cart.decrement("p1");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.add(item("a", 299)).unwrap();
        cart.add(item("a", 299)).unwrap();
        cart.add(item("b", 1000)).unwrap();

        let totals = cart.totals();
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.total_quantity, 3);
        assert_eq!(totals.subtotal.cents(), 1598);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        assert_eq!(cart.clear(), CartChange::Unchanged);

        cart.add(item("a", 100)).unwrap();
        assert_eq!(cart.clear(), CartChange::Cleared);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_snapshot_round_trip_preserves_order() {
        let mut cart = Cart::new();
        cart.add(item("z", 100)).unwrap();
        cart.add(item("a", 200)).unwrap();
        cart.increment("a");

        let snapshot = cart.to_snapshot().unwrap();
        let restored = Cart::from_snapshot(&snapshot).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_malformed_snapshots_are_rejected() {
        assert!(Cart::from_snapshot("not json").is_err());
        assert!(Cart::from_snapshot("{\"id\":\"p1\"}").is_err());
        assert!(Cart::from_snapshot(
            r#"[{"id":"p1","title":"t","imageUrl":"i","unitPrice":100,"quantity":0}]"#
        )
        .is_err());

        let dup = r#"[
            {"id":"p1","title":"t","imageUrl":"i","unitPrice":100,"quantity":1},
            {"id":"p1","title":"t","imageUrl":"i","unitPrice":100,"quantity":2}
        ]"#;
        let err = Cart::from_snapshot(dup).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_empty_array_is_an_empty_cart() {
        let cart = Cart::from_snapshot("[]").unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decimal_prices_decode_as_rounded_cents() {
        let snapshot = r#"[
            {"id":"p1","title":"A","imageUrl":"i","unitPrice":10.5,"quantity":2},
            {"id":"p2","title":"B","imageUrl":"i","unitPrice":3,"quantity":1}
        ]"#;
        let cart = Cart::from_snapshot(snapshot).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get("p1").unwrap().unit_price.cents(), 11);
        assert_eq!(cart.get("p2").unwrap().unit_price.cents(), 3);

        // Re-encoded as integer cents.
        assert!(cart.to_snapshot().unwrap().contains(r#""unitPrice":11"#));
    }

    #[test]
    fn test_negative_decimal_price_is_rejected() {
        let snapshot = r#"[{"id":"p1","title":"A","imageUrl":"i","unitPrice":-0.6,"quantity":1}]"#;
        assert!(matches!(
            Cart::from_snapshot(snapshot),
            Err(CoreError::InvalidSnapshot(_))
        ));
    }
}
