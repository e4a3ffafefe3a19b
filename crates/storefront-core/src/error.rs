//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - The four failure kinds of the client core      │
//! │  │   ├── Network      - transport failure / timeout on a backend call  │
//! │  │   ├── NotFound     - backend says "no such resource"                │
//! │  │   ├── Validation   - malformed local input                          │
//! │  │   └── IllegalState - operation not allowed in the current state     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                 │
//! │  └── DbError          - Local storage failures                         │
//! │                                                                         │
//! │  storefront-api errors (separate crate)                                │
//! │  └── ClientError      - REST backend failures                          │
//! │                                                                         │
//! │  Flow: ClientError/DbError → CoreError → AppError → presentation       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core client errors.
///
/// Network and NotFound failures are never allowed to escape to the
/// surrounding application: the stores and the checkout workflow turn them
/// into user-visible state with a retry affordance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Transport-level failure on a backend call, including timeouts.
    #[error("Network failure: {0}")]
    Network(String),

    /// The backend reported that the resource does not exist.
    ///
    /// ## When This Occurs
    /// - Unknown product id on the product detail page
    /// - No QR code configured for a bank + amount combination
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Operation requested in a state that does not permit it.
    #[error("Cannot {operation} while {state}")]
    IllegalState { operation: String, state: String },
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an IllegalState error.
    pub fn illegal_state(operation: impl Into<String>, state: impl Into<String>) -> Self {
        CoreError::IllegalState {
            operation: operation.into(),
            state: state.into(),
        }
    }

    /// Returns true for the NotFound variant.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used both for user input (price range filters) and for data read back
/// from local storage (a persisted cart that no longer validates).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. a price range that is not "min-max").
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g. two cart lines for one product).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
