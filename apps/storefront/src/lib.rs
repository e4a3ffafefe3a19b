//! # Storefront App Library
//!
//! Orchestration layer of the storefront client. It wires configuration,
//! local storage and the backend gateway into the stateful stores the
//! presentation layer talks to.
//!
//! ## Module Organization
//! ```text
//! storefront_app/
//! ├── lib.rs          ◄─── You are here (bootstrap & tracing)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── session.rs  ◄─── Session id (persisted or degraded)
//! │   ├── cart.rs     ◄─── Persisted cart + explicit server sync
//! │   └── catalog.rs  ◄─── Products, filters, refresh
//! ├── checkout.rs     ◄─── Payment QR workflow driver
//! └── error.rs        ◄─── Error type for the presentation layer
//! ```
//!
//! ## Example
//! ```rust,ignore
//! storefront_app::init_tracing();
//!
//! let config = StorefrontConfig::load_or_default(None);
//! let mut app = Storefront::bootstrap(config).await?;
//!
//! app.refresh_catalog().await?;
//! let product = app.catalog().view().products[0].clone();
//! app.cart_mut().add_to_cart(&product).await?;
//!
//! let mut checkout = app.open_checkout_for_cart().await?;
//! checkout.settle().await;
//! ```

pub mod checkout;
pub mod error;
pub mod state;

#[cfg(test)]
mod tests_support;

use std::sync::Arc;

use storefront_api::{ApiGateway, HttpGateway, RetryPolicy, SaveCartAck, StorefrontConfig};
use storefront_core::{Product, SessionId};
use storefront_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub use checkout::PaymentQrWorkflow;
pub use error::{AppError, AppResult, ErrorCode};
pub use state::{CartStore, CatalogState, SessionManager};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront_app=trace` - Trace this crate only
/// - Default: INFO, DEBUG for the storefront crates
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// A running storefront client.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Validate configuration                                              │
/// │  2. Open the SQLite database (creating its directory), run migrations   │
/// │  3. Build the HTTP gateway                                              │
/// │  4. Resolve the session id (degraded mode if storage fails)             │
/// │  5. Load the persisted cart                                             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub struct Storefront {
    config: StorefrontConfig,
    db: Database,
    gateway: Arc<dyn ApiGateway>,
    sessions: SessionManager,
    cart: CartStore,
    catalog: CatalogState,
}

impl Storefront {
    /// Opens local storage and the HTTP gateway described by `config`.
    pub async fn bootstrap(config: StorefrontConfig) -> AppResult<Self> {
        config.validate()?;

        let db_path = config.database_path();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::new(
                    ErrorCode::StorageError,
                    format!("Cannot create data directory {}: {}", parent.display(), e),
                )
            })?;
        }
        info!(path = %db_path.display(), "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        let gateway: Arc<dyn ApiGateway> = Arc::new(HttpGateway::new(&config.api)?);

        Self::with_parts(config, db, gateway).await
    }

    /// Assembles the client from already opened parts.
    pub async fn with_parts(
        config: StorefrontConfig,
        db: Database,
        gateway: Arc<dyn ApiGateway>,
    ) -> AppResult<Self> {
        let mut sessions = SessionManager::new(db.sessions());
        let session_id = sessions.ensure_session().await;

        let cart = match CartStore::load(db.carts(), session_id.clone()).await {
            Ok(cart) => cart,
            Err(err) => {
                warn!(error = %err, "Stored cart unavailable, starting empty");
                CartStore::empty(db.carts(), session_id)
            }
        };

        let catalog = CatalogState::new(RetryPolicy::from_settings(&config.api));

        info!(
            session_id = %cart.session_id(),
            lines = cart.items().len(),
            degraded = sessions.is_degraded(),
            "Storefront ready"
        );

        Ok(Storefront {
            config,
            db,
            gateway,
            sessions,
            cart,
            catalog,
        })
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn gateway(&self) -> Arc<dyn ApiGateway> {
        Arc::clone(&self.gateway)
    }

    pub fn session_id(&self) -> &SessionId {
        self.cart.session_id()
    }

    /// True when the session id lives in memory only.
    pub fn is_session_degraded(&self) -> bool {
        self.sessions.is_degraded()
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    pub fn catalog(&self) -> &CatalogState {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut CatalogState {
        &mut self.catalog
    }

    pub async fn refresh_catalog(&mut self) -> AppResult<usize> {
        self.catalog.refresh(self.gateway.as_ref()).await
    }

    pub async fn push_cart(&self) -> AppResult<SaveCartAck> {
        self.cart.push_to_server(self.gateway.as_ref()).await
    }

    pub async fn restore_cart(&mut self) -> AppResult<usize> {
        self.cart.restore_from_server(self.gateway.as_ref()).await
    }

    /// "Buy now": checkout for a single unit of `product`.
    pub async fn open_checkout_for_product(&self, product: &Product) -> AppResult<PaymentQrWorkflow> {
        PaymentQrWorkflow::open(self.gateway(), product.price, &self.config.checkout).await
    }

    /// Checkout for the current cart total.
    pub async fn open_checkout_for_cart(&self) -> AppResult<PaymentQrWorkflow> {
        PaymentQrWorkflow::open(self.gateway(), self.cart.total_price(), &self.config.checkout)
            .await
    }

    /// Closes the database pool.
    pub async fn shutdown(self) {
        self.db.close().await;
        info!("Storefront shut down");
    }
}
