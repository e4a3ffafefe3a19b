//! # Cart
//!
//! Pure cart state and its transitions.
//!
//! ## Transition Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Transitions                                  │
//! │                                                                         │
//! │   old Cart ──── with_added(product) ─────────► new Cart                 │
//! │            ──── without(product_id) ─────────►                          │
//! │            ──── with_quantity(id, n) ────────►                          │
//! │            ──── cleared() ───────────────────►                          │
//! │                                                                         │
//! │  Every transition takes &self and returns a NEW Cart. The caller        │
//! │  persists the new value and only then replaces the old one, so a        │
//! │  failed write never leaves a half-applied cart behind.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one [`CartItem`] per product id
//! - Every quantity is ≥ 1 (setting 0 or less removes the line)
//! - Insertion order is preserved by every transition that keeps a line
//! - The snapshot taken at first add is never refreshed: price at first add wins
//! - Totals are recomputed from the items on every call, never cached

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::pricing::Price;
use crate::types::{Product, SessionId};
use crate::validation::validate_cart_items;

// =============================================================================
// Cart Item
// =============================================================================

/// One cart line.
///
/// The persisted record format is `{product_id, quantity, product}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    /// Product id, equal to `product.id`.
    pub product_id: String,

    /// Quantity, always ≥ 1.
    pub quantity: i64,

    /// Frozen copy of the product at the moment it was first added.
    pub product: Product,
}

impl CartItem {
    /// Creates a line with quantity 1 and a snapshot of `product`.
    pub fn from_product(product: &Product) -> Self {
        CartItem {
            product_id: product.id.clone(),
            quantity: 1,
            product: product.clone(),
        }
    }

    /// Snapshot price × quantity.
    pub fn line_total(&self) -> i64 {
        Price::new(self.product.price).times(self.quantity).value()
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Cart contents tagged with the session they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    session_id: SessionId,
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new(session_id: SessionId) -> Self {
        Cart {
            session_id,
            items: Vec::new(),
        }
    }

    /// Rebuilds a cart from stored items.
    ///
    /// Fails when the items break a cart invariant; callers reading from
    /// storage discard the record in that case.
    pub fn from_items(session_id: SessionId, items: Vec<CartItem>) -> Result<Self, CoreError> {
        validate_cart_items(&items)?;
        Ok(Cart { session_id, items })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the cart with one more unit of `product`.
    ///
    /// An existing line keeps its original snapshot and only gains quantity.
    #[must_use]
    pub fn with_added(&self, product: &Product) -> Cart {
        let mut items = self.items.clone();

        match items.iter_mut().find(|i| i.product_id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => items.push(CartItem::from_product(product)),
        }

        Cart {
            session_id: self.session_id.clone(),
            items,
        }
    }

    /// Returns the cart without the line for `product_id` (no-op if absent).
    #[must_use]
    pub fn without(&self, product_id: &str) -> Cart {
        Cart {
            session_id: self.session_id.clone(),
            items: self
                .items
                .iter()
                .filter(|i| i.product_id != product_id)
                .cloned()
                .collect(),
        }
    }

    /// Returns the cart with the line's quantity set to `quantity`.
    ///
    /// `quantity <= 0` is exactly [`Cart::without`]. An absent id is a no-op.
    #[must_use]
    pub fn with_quantity(&self, product_id: &str, quantity: i64) -> Cart {
        if quantity <= 0 {
            return self.without(product_id);
        }

        let mut items = self.items.clone();
        if let Some(item) = items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity;
        }

        Cart {
            session_id: self.session_id.clone(),
            items,
        }
    }

    /// Returns an empty cart with the same session id.
    #[must_use]
    pub fn cleared(&self) -> Cart {
        Cart::new(self.session_id.clone())
    }

    /// Σ(snapshot price × quantity).
    pub fn total_price(&self) -> i64 {
        self.items
            .iter()
            .map(|item| Price::new(item.line_total()))
            .sum::<Price>()
            .value()
    }

    /// Σ quantity (the header badge number).
    pub fn item_count(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Snapshot for the presentation layer.
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            session_id: self.session_id.clone(),
            items: self.items.clone(),
            item_count: self.item_count(),
            total_price: self.total_price(),
        }
    }
}

/// Derived cart view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartSummary {
    pub session_id: SessionId,
    pub items: Vec<CartItem>,
    pub item_count: i64,
    pub total_price: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            category: "Веб-разработка".to_string(),
            price,
            short_description: String::new(),
            full_description: String::new(),
            delivery_time: "3-5 дней".to_string(),
            icon: "💼".to_string(),
            image_url: None,
            features: vec![],
            technologies: vec![],
        }
    }

    fn empty_cart() -> Cart {
        Cart::new(SessionId::from_parts(1_718_000_000_000, 42))
    }

    #[test]
    fn test_adding_same_product_twice_merges_lines() {
        let p = product("1", 1000);
        let cart = empty_cart().with_added(&p).with_added(&p);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get("1").unwrap().quantity, 2);
    }

    #[test]
    fn test_totals() {
        let cart = empty_cart();
        assert_eq!(cart.total_price(), 0);
        assert_eq!(cart.item_count(), 0);

        let a = product("1", 1000);
        let b = product("2", 2000);
        let cart = cart.with_added(&a).with_added(&a).with_added(&b);

        assert_eq!(cart.total_price(), 4000);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_snapshot_price_wins() {
        let original = product("1", 1000);
        let mut repriced = original.clone();
        repriced.price = 9999;

        let cart = empty_cart().with_added(&original).with_added(&repriced);
        assert_eq!(cart.get("1").unwrap().product.price, 1000);
        assert_eq!(cart.total_price(), 2000);
    }

    #[test]
    fn test_zero_quantity_equals_remove() {
        let cart = empty_cart()
            .with_added(&product("1", 1000))
            .with_added(&product("2", 500));

        assert_eq!(cart.with_quantity("1", 0), cart.without("1"));
        assert_eq!(cart.with_quantity("1", -4), cart.without("1"));
    }

    #[test]
    fn test_set_quantity_replaces_not_increments() {
        let cart = empty_cart().with_added(&product("1", 1000)).with_quantity("1", 5);
        assert_eq!(cart.get("1").unwrap().quantity, 5);
        assert_eq!(cart.total_price(), 5000);
    }

    #[test]
    fn test_absent_ids_are_noops() {
        let cart = empty_cart().with_added(&product("1", 1000));
        assert_eq!(cart.without("missing"), cart);
        assert_eq!(cart.with_quantity("missing", 3), cart);
    }

    #[test]
    fn test_order_preserved_across_updates() {
        let cart = empty_cart()
            .with_added(&product("a", 1))
            .with_added(&product("b", 1))
            .with_added(&product("c", 1))
            .with_quantity("b", 7)
            .with_added(&product("a", 1))
            .without("c");

        let ids: Vec<_> = cart.items().iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_clear_keeps_session() {
        let cart = empty_cart().with_added(&product("1", 1000));
        let cleared = cart.cleared();
        assert!(cleared.is_empty());
        assert_eq!(cleared.session_id(), cart.session_id());
    }

    #[test]
    fn test_from_items_rejects_invalid() {
        let session = SessionId::from_parts(0, 0);
        let mut bad = CartItem::from_product(&product("1", 100));
        bad.quantity = 0;

        assert!(Cart::from_items(session.clone(), vec![bad]).is_err());
        assert!(Cart::from_items(session, vec![CartItem::from_product(&product("1", 100))]).is_ok());
    }

    #[test]
    fn test_summary_wire_format() {
        let cart = empty_cart().with_added(&product("1", 1500));
        let value = serde_json::to_value(cart.summary()).unwrap();

        assert_eq!(value["itemCount"], 1);
        assert_eq!(value["totalPrice"], 1500);
        assert_eq!(value["items"][0]["product_id"], "1");
    }
}
