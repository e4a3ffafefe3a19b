//! # Wire Protocol
//!
//! Request and response bodies of the REST backend that are not plain core
//! types. Products and QR payments travel as [`storefront_core::Product`] and
//! [`storefront_core::QrPayment`] directly.
//!
//! ## Endpoints
//! ```text
//! GET  {base}/products                 → [Product, ...]
//! GET  {base}/products/{id}            → Product            (404 unknown id)
//! POST {base}/cart/save                ← SaveCartRequest    → SaveCartAck
//! GET  {base}/cart/{session_id}        → RemoteCart         ({"items": []} when none)
//! GET  {base}/banks                    → BanksResponse
//! GET  {base}/qr-code/{bank}/{amount}  → QrPayment          (404 not configured)
//! ```

use serde::{Deserialize, Serialize};
use storefront_core::{BankDirectory, CartItem, SessionId};

/// Server-side cart line: only the product reference and quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCartItem {
    pub product_id: String,
    pub quantity: i64,
}

impl From<&CartItem> for RemoteCartItem {
    fn from(item: &CartItem) -> Self {
        RemoteCartItem {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
        }
    }
}

/// Body of `POST /cart/save`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveCartRequest {
    pub session_id: SessionId,
    pub items: Vec<RemoteCartItem>,
}

/// Acknowledgement of `POST /cart/save`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveCartAck {
    pub status: String,
    pub session_id: String,
}

impl SaveCartAck {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Body of `GET /cart/{session_id}`. Extra server fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCart {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub items: Vec<RemoteCartItem>,
}

/// Body of `GET /banks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanksResponse {
    pub banks: BankDirectory,
}
