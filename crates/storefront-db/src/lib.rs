//! # storefront-db: Local Storage for the Storefront
//!
//! Durable client-side records behind a two-key contract: the session id
//! (`cart_session_id`) and the serialized cart (`cart_items`), stored in a
//! SQLite `local_state` table via sqlx.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Local state, session and cart repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("storefront.db")).await?;
//!
//! let session = db.sessions().load().await?;
//! let items = db.carts().load().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::cart::CartRepository;
pub use repository::local_state::LocalStateRepository;
pub use repository::session::SessionRepository;
