//! # storefront-api: REST Backend Gateway
//!
//! Everything the storefront client needs to talk to its backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  apps/storefront                                                        │
//! │   CatalogState ──┐                                                      │
//! │   CartStore ─────┼──► Arc<dyn ApiGateway> ──► HttpGateway ──► backend  │
//! │   QR workflow ───┘          ▲                                           │
//! │                             └── test fakes                              │
//! │                                                                         │
//! │  StorefrontConfig ──► HttpGateway::new(&config.api)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`gateway`] - The `ApiGateway` trait and catalog retry
//! - [`http`] - reqwest implementation
//! - [`protocol`] - Wire DTOs
//! - [`config`] - Client configuration (TOML + environment)
//! - [`error`] - Gateway errors and their classification

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod protocol;

pub use config::{ApiSettings, CheckoutSettings, StorageSettings, StorefrontConfig};
pub use error::{ClientError, ClientResult};
pub use gateway::{list_products_with_retry, ApiGateway, RetryPolicy};
pub use http::HttpGateway;
pub use protocol::{RemoteCartItem, SaveCartAck};
