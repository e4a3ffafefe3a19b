//! # storefront-core: Pure Client State for the Storefront
//!
//! This crate holds every piece of client-side state logic that has real
//! invariants: cart transitions, catalog filtering, and the bank-QR checkout
//! state machine. It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storefront Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Presentation layer (external)                  │   │
//! │  │    Catalog page ──► Product page ──► Cart page ──► QR modal     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                apps/storefront (orchestration)                  │   │
//! │  │    SessionManager, CartStore, CatalogState, PaymentQrWorkflow   │   │
//! │  └──────────┬──────────────────┬──────────────────────┬────────────┘   │
//! │             │                  │                      │                 │
//! │  ┌──────────▼──────────┐ ┌─────▼──────────────┐ ┌─────▼──────────────┐ │
//! │  │ ★ storefront-core ★ │ │  storefront-db     │ │  storefront-api    │ │
//! │  │  cart, catalog,     │ │  session id +      │ │  REST gateway      │ │
//! │  │  checkout FSM       │ │  cart records      │ │  (reqwest)         │ │
//! │  │  NO I/O             │ │  (SQLite)          │ │                    │ │
//! │  └─────────────────────┘ └────────────────────┘ └────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, SessionId, Bank, BankDirectory, QrPayment
//! - [`cart`] - Cart and CartItem with old → new transitions
//! - [`catalog`] - Filter/sort derivation of the catalog view
//! - [`checkout`] - QR checkout state machine with request tokens
//! - [`pricing`] - `Price` arithmetic and display formatting
//! - [`error`] - Domain error types
//! - [`validation`] - Input and stored-record validation
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::{Cart, Product, SessionId};
//!
//! let product = Product {
//!     id: "landing".to_string(),
//!     name: "Лендинг".to_string(),
//!     category: "Веб-разработка".to_string(),
//!     price: 1000,
//!     short_description: String::new(),
//!     full_description: String::new(),
//!     delivery_time: "3 дня".to_string(),
//!     icon: "🚀".to_string(),
//!     image_url: None,
//!     features: vec![],
//!     technologies: vec![],
//! };
//!
//! let cart = Cart::new(SessionId::generate())
//!     .with_added(&product)
//!     .with_added(&product);
//!
//! assert_eq!(cart.items().len(), 1);
//! assert_eq!(cart.total_price(), 2000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem, CartSummary};
pub use catalog::{CatalogView, FilterParams, PriceRange, SortOrder};
pub use checkout::{CheckoutCommand, CheckoutState, QrCheckout, QrRequest, RequestToken};
pub use error::{CoreError, CoreResult, ValidationError};
pub use pricing::Price;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Local storage key of the session identifier record.
pub const SESSION_ID_KEY: &str = "cart_session_id";

/// Local storage key of the serialized cart item sequence.
pub const CART_ITEMS_KEY: &str = "cart_items";
