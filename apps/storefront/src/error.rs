//! # App Error Type
//!
//! Unified error type handed to the presentation layer.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  CartStore / CatalogState / PaymentQrWorkflow                           │
//! │         │                                                               │
//! │         ├── DbError::ConnectionFailed ──────┐                           │
//! │         ├── ClientError::Status { 502 } ────┼──► AppError { code, msg } │
//! │         └── CoreError::IllegalState ────────┘            │              │
//! │                                                          ▼              │
//! │                                 { "code": "NETWORK_ERROR",              │
//! │                                   "message": "Backend unavailable" }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage and internal details are logged here and replaced by a generic
//! message; the presentation layer only ever sees `code` and `message`.

use serde::Serialize;
use storefront_api::ClientError;
use storefront_core::CoreError;
use storefront_db::DbError;
use thiserror::Error;

/// Error returned by storefront operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: p-42"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct AppError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Local storage failed
    StorageError,

    /// Backend unreachable, failing, or too slow
    NetworkError,

    /// Operation not permitted in the current state
    IllegalState,

    /// Configuration is invalid
    ConfigError,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

/// Converts local storage errors.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AppError::not_found(&entity, &id),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Storage connection failed: {}", e);
                AppError::new(ErrorCode::StorageError, "Local storage unavailable")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Storage migration failed: {}", e);
                AppError::new(ErrorCode::StorageError, "Local storage migration failed")
            }
            DbError::PoolExhausted => {
                AppError::new(ErrorCode::StorageError, "Local storage is busy")
            }
            DbError::QueryFailed(e) | DbError::Serialization(e) | DbError::Internal(e) => {
                tracing::error!("Storage operation failed: {}", e);
                AppError::new(ErrorCode::StorageError, "Local storage operation failed")
            }
        }
    }
}

/// Converts backend gateway errors.
impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        if err.is_config_error() {
            return AppError::new(ErrorCode::ConfigError, err.to_string());
        }

        match err {
            ClientError::NotFound { resource } => AppError::not_found("Resource", &resource),
            ClientError::InvalidResponse(e) => {
                tracing::warn!("Backend sent an unexpected response: {}", e);
                AppError::new(ErrorCode::NetworkError, "Unexpected backend response")
            }
            other => {
                tracing::warn!("Backend call failed: {}", other);
                AppError::new(ErrorCode::NetworkError, "Backend unavailable")
            }
        }
    }
}

/// Converts core errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => AppError::not_found(&entity, &id),
            CoreError::Network(e) => AppError::new(ErrorCode::NetworkError, e),
            CoreError::Validation(e) => AppError::validation(e.to_string()),
            err @ CoreError::IllegalState { .. } => {
                AppError::new(ErrorCode::IllegalState, err.to_string())
            }
        }
    }
}
