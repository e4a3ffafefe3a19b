//! # Repository Module
//!
//! Local storage repositories.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SessionRepository ──┐                                                  │
//! │   (cart_session_id)  │                                                  │
//! │                      ├──► LocalStateRepository ──► local_state table   │
//! │  CartRepository ─────┘     get / put / delete                           │
//! │   (cart_items)                                                          │
//! │                                                                         │
//! │  The two records are independent: losing or discarding one never      │
//! │  touches the other.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`LocalStateRepository`](local_state::LocalStateRepository) - raw key-value records
//! - [`SessionRepository`](session::SessionRepository) - session id
//! - [`CartRepository`](cart::CartRepository) - cart items

pub mod cart;
pub mod local_state;
pub mod session;
