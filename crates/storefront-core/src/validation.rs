//! # Validation Module
//!
//! Input validation for the storefront client.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Points                                  │
//! │                                                                         │
//! │  Backend data (products, QR payments)                                  │
//! │  └── validate_product, validate_price                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Cart transitions                                                       │
//! │  └── validate_quantity (quantity ≤ 0 means "remove", never an error)   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Persisted cart read back from local storage                           │
//! │  └── validate_cart_items: a record that fails is DISCARDED, the store  │
//! │      starts empty instead                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_payment_amount, validate_quantity};
//!
//! assert!(validate_quantity(2).is_ok());
//! assert!(validate_payment_amount(0).is_err());
//! ```

use std::collections::HashSet;

use crate::cart::CartItem;
use crate::error::ValidationError;
use crate::types::Product;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a product identifier.
///
/// ## Rules
/// - Must not be empty or whitespace
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "product id".to_string(),
        });
    }

    Ok(())
}

/// Validates a stored cart line quantity.
///
/// ## Rules
/// - Must be at least 1
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a product price in whole currency units.
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_price;
///
/// assert!(validate_price(5000).is_ok());
/// assert!(validate_price(0).is_ok());
/// assert!(validate_price(-1).is_err());
/// ```
pub fn validate_price(price: i64) -> ValidationResult<()> {
    if price < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a checkout amount.
///
/// Zero is not payable; the checkout workflow does not request a QR for it.
pub fn validate_payment_amount(amount: i64) -> ValidationResult<()> {
    if amount <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a product snapshot.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_product_id(&product.id)?;
    validate_price(product.price)?;
    Ok(())
}

/// Validates a full cart item sequence as read back from storage.
///
/// ## Rules
/// - Every line has quantity ≥ 1
/// - Every snapshot is a valid product whose id equals the line's product id
/// - At most one line per product id
pub fn validate_cart_items(items: &[CartItem]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(items.len());

    for item in items {
        validate_product_id(&item.product_id)?;
        validate_quantity(item.quantity)?;
        validate_product(&item.product)?;

        if item.product.id != item.product_id {
            return Err(ValidationError::InvalidFormat {
                field: "cart item".to_string(),
                reason: format!(
                    "snapshot id '{}' does not match product id '{}'",
                    item.product.id, item.product_id
                ),
            });
        }

        if !seen.insert(item.product_id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "cart item".to_string(),
                value: item.product_id.clone(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
