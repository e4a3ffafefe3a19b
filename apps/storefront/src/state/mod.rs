//! # State Module
//!
//! Long-lived client state, one type per concern.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐  │
//! │  │  SessionManager  │  │    CartStore     │  │    CatalogState      │  │
//! │  │                  │  │                  │  │                      │  │
//! │  │  cart_session_id │─►│  Cart (core)     │  │  products            │  │
//! │  │  (degraded mode  │  │  cart_items      │  │  FilterParams        │  │
//! │  │   in memory)     │  │  push / restore  │  │  last_error          │  │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────────┘  │
//! │           │                     │                       │               │
//! │           └───── Database ──────┘          Arc<dyn ApiGateway>          │
//! │                                                                         │
//! │  EXCLUSIVE ACCESS:                                                      │
//! │  • Every mutation takes `&mut self`; the owner serializes calls         │
//! │  • Backend calls are the only suspension points                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod catalog;
mod session;

pub use cart::CartStore;
pub use catalog::{CatalogState, CATALOG_LOAD_ERROR};
pub use session::SessionManager;
