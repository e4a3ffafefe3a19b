//! # Cart State
//!
//! The persisted shopping cart.
//!
//! ## Commit Protocol
//! Every mutation computes the next [`Cart`] with a pure transition from
//! `storefront-core`, writes it to local storage, and only then replaces the
//! in-memory cart. A failed write leaves the previous cart in place.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  add_to_cart(p) ──────► cart.with_added(p) ─────┐                       │
//! │  remove_from_cart(id) ► cart.without(id) ───────┤                       │
//! │  update_quantity(id,n)► cart.with_quantity() ───┼──► save ──► commit    │
//! │  clear_cart() ────────► cart.cleared() ─────────┘      │                │
//! │                                                        └─ Err: keep old │
//! │                                                                         │
//! │  push_to_server ──────► POST /cart/save   (explicit, never automatic)   │
//! │  restore_from_server ─► GET /cart/{sid}   (only into an empty cart)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use storefront_api::{ApiGateway, RemoteCartItem, SaveCartAck};
use storefront_core::validation::validate_product;
use storefront_core::{Cart, CartItem, CartSummary, CoreError, Product, SessionId};
use storefront_db::CartRepository;
use tracing::{debug, info, warn};

use crate::error::AppResult;

/// The cart of the current session, kept in sync with local storage.
#[derive(Debug)]
pub struct CartStore {
    carts: CartRepository,
    cart: Cart,
}

impl CartStore {
    /// Loads the stored cart for `session_id`.
    ///
    /// A missing or corrupt record yields an empty cart; only an unreadable
    /// store is an error.
    pub async fn load(carts: CartRepository, session_id: SessionId) -> AppResult<Self> {
        let items = carts.load().await?;
        let cart = Cart::from_items(session_id.clone(), items).unwrap_or_else(|err| {
            warn!(error = %err, "Stored cart rejected, starting empty");
            Cart::new(session_id)
        });

        debug!(lines = cart.items().len(), "Cart loaded");
        Ok(CartStore { carts, cart })
    }

    /// An empty cart that was not read from storage.
    pub fn empty(carts: CartRepository, session_id: SessionId) -> Self {
        CartStore {
            carts,
            cart: Cart::new(session_id),
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    pub fn session_id(&self) -> &SessionId {
        self.cart.session_id()
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Σ(snapshot price × quantity).
    pub fn total_price(&self) -> i64 {
        self.cart.total_price()
    }

    /// Σ quantity, the header badge count.
    pub fn item_count(&self) -> i64 {
        self.cart.item_count()
    }

    pub fn summary(&self) -> CartSummary {
        self.cart.summary()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one unit of `product`. A product already in the cart keeps the
    /// snapshot taken when it was first added.
    pub async fn add_to_cart(&mut self, product: &Product) -> AppResult<()> {
        validate_product(product).map_err(CoreError::from)?;

        let next = self.cart.with_added(product);
        self.commit(next).await?;

        debug!(product_id = %product.id, count = self.item_count(), "Added to cart");
        Ok(())
    }

    pub async fn remove_from_cart(&mut self, product_id: &str) -> AppResult<()> {
        let next = self.cart.without(product_id);
        self.commit(next).await
    }

    /// Sets the quantity of a line; `quantity <= 0` removes it.
    pub async fn update_quantity(&mut self, product_id: &str, quantity: i64) -> AppResult<()> {
        let next = self.cart.with_quantity(product_id, quantity);
        self.commit(next).await
    }

    pub async fn clear_cart(&mut self) -> AppResult<()> {
        let next = self.cart.cleared();
        self.commit(next).await
    }

    async fn commit(&mut self, next: Cart) -> AppResult<()> {
        if next == self.cart {
            return Ok(());
        }

        self.carts.save(next.items()).await?;
        self.cart = next;
        Ok(())
    }

    // =========================================================================
    // Server Sync
    // =========================================================================

    /// Stores the cart server-side under the session id.
    pub async fn push_to_server(&self, gateway: &dyn ApiGateway) -> AppResult<SaveCartAck> {
        let items: Vec<RemoteCartItem> = self.items().iter().map(RemoteCartItem::from).collect();
        let ack = gateway.save_cart(self.session_id(), &items).await?;

        if ack.is_success() {
            info!(session_id = %self.session_id(), lines = items.len(), "Cart saved to server");
        } else {
            warn!(status = %ack.status, "Backend did not confirm cart save");
        }

        Ok(ack)
    }

    /// Replaces an empty local cart with the server-side one.
    ///
    /// Products are re-fetched to build snapshots; lines for products the
    /// backend no longer knows are skipped. Returns the number of lines
    /// restored. A non-empty local cart is never touched.
    pub async fn restore_from_server(&mut self, gateway: &dyn ApiGateway) -> AppResult<usize> {
        if !self.is_empty() {
            debug!("Local cart not empty, skipping server restore");
            return Ok(0);
        }

        let remote = gateway.load_cart(self.session_id()).await?;
        let mut next = self.cart.clone();

        for line in remote {
            if line.quantity < 1 {
                warn!(product_id = %line.product_id, quantity = line.quantity, "Skipping server cart line");
                continue;
            }

            let product = match gateway.get_product(&line.product_id).await {
                Ok(product) => product,
                Err(err) if err.is_not_found() => {
                    warn!(product_id = %line.product_id, "Skipping unknown product in server cart");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            if let Err(err) = validate_product(&product) {
                warn!(product_id = %line.product_id, error = %err, "Skipping invalid product in server cart");
                continue;
            }

            let quantity = next
                .get(&product.id)
                .map_or(0, |item| item.quantity)
                .saturating_add(line.quantity);
            next = next.with_added(&product).with_quantity(&product.id, quantity);
        }

        let restored = next.items().len();
        self.commit(next).await?;

        info!(lines = restored, "Cart restored from server");
        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::tests_support::{product, FakeGateway};
    use storefront_db::{Database, DbConfig};

    async fn store(db: &Database) -> CartStore {
        CartStore::load(db.carts(), SessionId::from_parts(1718000000000, 7))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_same_product_twice() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut cart = store(&db).await;
        let p = product("1", 1000);

        cart.add_to_cart(&p).await.unwrap();
        cart.add_to_cart(&p).await.unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_totals() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut cart = store(&db).await;
        assert_eq!(cart.total_price(), 0);

        let one = product("1", 1000);
        cart.add_to_cart(&one).await.unwrap();
        cart.add_to_cart(&one).await.unwrap();
        cart.add_to_cart(&product("2", 2000)).await.unwrap();

        assert_eq!(cart.total_price(), 4000);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.summary().total_price, 4000);
    }

    #[tokio::test]
    async fn test_every_mutation_is_persisted() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut cart = store(&db).await;

        cart.add_to_cart(&product("1", 1000)).await.unwrap();
        cart.add_to_cart(&product("2", 2000)).await.unwrap();
        cart.update_quantity("1", 5).await.unwrap();
        assert_eq!(db.carts().load().await.unwrap(), cart.items());

        cart.update_quantity("1", 0).await.unwrap();
        assert_eq!(db.carts().load().await.unwrap(), cart.items());
        assert!(cart.cart().get("1").is_none());

        cart.clear_cart().await.unwrap();
        assert!(db.carts().load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reload_restores_state() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut cart = store(&db).await;
        cart.add_to_cart(&product("1", 1000)).await.unwrap();
        cart.add_to_cart(&product("2", 2000)).await.unwrap();

        let reloaded = store(&db).await;
        assert_eq!(reloaded.cart(), cart.cart());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_state() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut cart = store(&db).await;
        cart.add_to_cart(&product("1", 1000)).await.unwrap();

        db.close().await;
        let err = cart.add_to_cart(&product("2", 2000)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::StorageError);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total_price(), 1000);
    }

    #[tokio::test]
    async fn test_invalid_product_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut cart = store(&db).await;

        let err = cart.add_to_cart(&product("1", -5)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut cart = store(&db).await;
        cart.add_to_cart(&product("1", 1000)).await.unwrap();

        cart.remove_from_cart("missing").await.unwrap();
        cart.update_quantity("missing", 3).await.unwrap();
        assert_eq!(cart.items().len(), 1);
    }

    #[tokio::test]
    async fn test_push_to_server() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let gateway = FakeGateway::default();
        let mut cart = store(&db).await;
        cart.add_to_cart(&product("1", 1000)).await.unwrap();
        cart.update_quantity("1", 3).await.unwrap();

        let ack = cart.push_to_server(&gateway).await.unwrap();
        assert!(ack.is_success());

        let saved = gateway.saved_cart(cart.session_id());
        assert_eq!(
            saved,
            vec![RemoteCartItem {
                product_id: "1".to_string(),
                quantity: 3,
            }]
        );
    }

    #[tokio::test]
    async fn test_restore_from_server() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let gateway = FakeGateway::default().with_products(vec![product("1", 1000)]);
        let mut cart = store(&db).await;
        gateway.put_remote_cart(
            cart.session_id(),
            vec![
                RemoteCartItem {
                    product_id: "1".to_string(),
                    quantity: 2,
                },
                RemoteCartItem {
                    product_id: "gone".to_string(),
                    quantity: 1,
                },
            ],
        );

        let restored = cart.restore_from_server(&gateway).await.unwrap();

        assert_eq!(restored, 1);
        assert_eq!(cart.total_price(), 2000);
        assert_eq!(db.carts().load().await.unwrap(), cart.items());
    }

    #[tokio::test]
    async fn test_restore_never_merges_into_local_cart() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let gateway = FakeGateway::default().with_products(vec![product("1", 1000)]);
        let mut cart = store(&db).await;
        cart.add_to_cart(&product("2", 2000)).await.unwrap();
        gateway.put_remote_cart(
            cart.session_id(),
            vec![RemoteCartItem {
                product_id: "1".to_string(),
                quantity: 2,
            }],
        );

        assert_eq!(cart.restore_from_server(&gateway).await.unwrap(), 0);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].product_id, "2");
    }
}
