//! # API Gateway
//!
//! The contract the client core consumes from its backend. [`HttpGateway`]
//! implements it over HTTP; tests substitute in-memory fakes.
//!
//! [`HttpGateway`]: crate::http::HttpGateway

use std::time::Duration;

use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use storefront_core::{BankDirectory, Product, QrPayment, SessionId};
use tracing::{debug, warn};

use crate::config::ApiSettings;
use crate::error::ClientResult;
use crate::protocol::{RemoteCartItem, SaveCartAck};

/// Backend operations consumed by the storefront client.
#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// All products in backend order.
    async fn list_products(&self) -> ClientResult<Vec<Product>>;

    /// One product; `ClientError::NotFound` for an unknown id.
    async fn get_product(&self, product_id: &str) -> ClientResult<Product>;

    /// Stores the cart server-side under `session_id`.
    async fn save_cart(
        &self,
        session_id: &SessionId,
        items: &[RemoteCartItem],
    ) -> ClientResult<SaveCartAck>;

    /// Server-side cart lines; empty when the backend has none.
    async fn load_cart(&self, session_id: &SessionId) -> ClientResult<Vec<RemoteCartItem>>;

    /// Bank directory in backend order.
    async fn bank_directory(&self) -> ClientResult<BankDirectory>;

    /// QR payment for `(bank, amount)`; `ClientError::NotFound` when the
    /// combination is not configured.
    async fn generate_qr(&self, bank: &str, amount: i64) -> ClientResult<QrPayment>;
}

// =============================================================================
// Retry
// =============================================================================

/// Bounded exponential backoff for idempotent reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &ApiSettings) -> Self {
        RetryPolicy {
            max_retries: settings.catalog_retries,
            initial_backoff: settings.initial_backoff(),
            max_backoff: settings.max_backoff(),
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// Lists products, retrying transient failures.
///
/// Only [`ClientError::is_retryable`](crate::ClientError::is_retryable)
/// failures are retried; a 404 or an undecodable body is returned at once.
pub async fn list_products_with_retry(
    gateway: &dyn ApiGateway,
    policy: RetryPolicy,
) -> ClientResult<Vec<Product>> {
    let mut backoff = policy.backoff();
    let mut attempt = 0u32;

    loop {
        match gateway.list_products().await {
            Ok(products) => {
                debug!(count = products.len(), attempt, "Products loaded");
                return Ok(products);
            }
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                let delay = backoff.next_backoff().unwrap_or(policy.max_backoff);
                warn!(error = %err, attempt, ?delay, "Product list failed, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
