//! # Cart Repository
//!
//! Persists the cart item sequence under `cart_items` as a JSON array of
//! `{product_id, quantity, product}`.
//!
//! ## Load Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stored record                     load() returns                       │
//! │  ─────────────                     ──────────────                       │
//! │  absent                        ──► empty                                │
//! │  valid JSON, valid items       ──► items (original order)               │
//! │  unparseable JSON              ──► empty, record deleted, warning       │
//! │  items breaking cart rules     ──► empty, record deleted, warning       │
//! │  (duplicate ids, quantity < 1)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Only storage failures are errors; bad data never is.

use storefront_core::validation::validate_cart_items;
use storefront_core::{CartItem, CART_ITEMS_KEY};
use tracing::{debug, warn};

use super::local_state::LocalStateRepository;
use crate::error::DbResult;

/// Repository for the persisted cart.
#[derive(Debug, Clone)]
pub struct CartRepository {
    state: LocalStateRepository,
}

impl CartRepository {
    pub fn new(state: LocalStateRepository) -> Self {
        CartRepository { state }
    }

    /// Loads the stored items, discarding a corrupt record.
    pub async fn load(&self) -> DbResult<Vec<CartItem>> {
        let Some(raw) = self.state.get(CART_ITEMS_KEY).await? else {
            debug!("No stored cart");
            return Ok(Vec::new());
        };

        let reason = match serde_json::from_str::<Vec<CartItem>>(&raw) {
            Ok(items) => match validate_cart_items(&items) {
                Ok(()) => {
                    debug!(lines = items.len(), "Loaded stored cart");
                    return Ok(items);
                }
                Err(err) => err.to_string(),
            },
            Err(err) => err.to_string(),
        };

        warn!(reason = %reason, "Discarding corrupt stored cart");
        self.state.delete(CART_ITEMS_KEY).await?;
        Ok(Vec::new())
    }

    /// Replaces the stored items.
    pub async fn save(&self, items: &[CartItem]) -> DbResult<()> {
        let json = serde_json::to_string(items)?;
        self.state.put(CART_ITEMS_KEY, &json).await
    }
}
