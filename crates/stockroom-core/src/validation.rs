//! # Validation Module
//!
//! Input validation utilities for Stockroom.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Console UI                                                   │
//! │  └── Selection widgets (only shipped orders offered for a sale)         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: stockroom-core                                               │
//! │  └── THIS MODULE: quantities, amounts, queries, credentials            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Remote store                                                 │
//! │  └── Authoritative stock check, referential integrity                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every validator here runs before a network call. A failure means the
//! remote store is never contacted.

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_LINES, MAX_QUERY_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a lookup query.
///
/// ## Rules
/// - Can be empty (products list the catalog, other kinds return nothing)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_search_query;
///
/// assert_eq!(validate_search_query("  cola ").unwrap(), "cola");
/// assert!(validate_search_query(&"x".repeat(101)).is_err());
/// ```
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

/// Validates login credentials.
///
/// ## Rules
/// - Email and password must not be blank
pub fn validate_credentials(email: &str, password: &str) -> ValidationResult<()> {
    if email.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Order form: Add Item                                                   │
/// │                                                                         │
/// │  Operator enters quantity: 5                                           │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       │                                                                 │
/// │       └── OK → stock check in the composer                             │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "unit price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock figure received from the store.
///
/// ## Rules
/// - Must be non-negative (>= 0)
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a sale amount or a manually set order total.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more line fits in the order.
///
/// ## Rules
/// - Must not exceed MAX_ORDER_LINES (100)
pub fn validate_order_size(current_lines: usize) -> ValidationResult<()> {
    if current_lines >= MAX_ORDER_LINES {
        return Err(ValidationError::TooManyLines {
            max: MAX_ORDER_LINES,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
