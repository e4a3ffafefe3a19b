//! # Gateway Error Types
//!
//! Errors raised while talking to the REST backend or loading client
//! configuration.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ClientError                         CoreError                          │
//! │  ───────────                         ─────────                          │
//! │  Http (connect, timeout, TLS)   ──►  Network                            │
//! │  Status (non-404 non-2xx)       ──►  Network                            │
//! │  InvalidResponse (bad JSON)     ──►  Network                            │
//! │  NotFound (404)                 ──►  NotFound                           │
//! │  InvalidConfig / InvalidUrl /                                           │
//! │  ConfigLoadFailed / ...         ──►  Validation                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use storefront_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for gateway operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Gateway and client configuration errors.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Request could not be completed (connection refused, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Backend answered with a non-success status other than 404.
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Backend answered 404 for the requested resource.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Response body could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid backend URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

impl From<ClientError> for CoreError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound { resource } => CoreError::not_found("Resource", resource),
            ClientError::Http(_) | ClientError::Status { .. } | ClientError::InvalidResponse(_) => {
                CoreError::Network(err.to_string())
            }
            other => CoreError::Validation(ValidationError::InvalidFormat {
                field: "configuration".to_string(),
                reason: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl ClientError {
    /// Returns true if repeating the same request may succeed.
    ///
    /// ## Retryable Errors
    /// - Transport failures and timeouts
    /// - 5xx and 429 responses
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(_) => true,
            ClientError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }
}
