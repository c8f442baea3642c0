//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── CoreError        - Domain errors (vocabulary, prompt state)        │
//! │  └── ValidationError  - Client-detectable bad input                    │
//! │                                                                         │
//! │  stockroom-client errors (separate crate)                              │
//! │  └── ClientError      - Remote failures, partial success, session      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → Console UI          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `ValidationError` is always raised BEFORE any network call. It never
//! reaches the remote store.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A status string outside the recognized wire vocabulary.
    ///
    /// ## When This Occurs
    /// - The remote store returns an order whose status is not one of
    ///   `Pendente`, `Processando`, `Enviado`, `Entregue`, `Cancelado`
    #[error("Unrecognized order status: '{0}'")]
    UnknownOrderStatus(String),

    /// A payment method string outside the recognized vocabulary.
    #[error("Unrecognized payment method: '{0}'")]
    UnknownPaymentMethod(String),

    /// `confirm` was called on a reconciliation prompt that is not awaiting
    /// a choice.
    #[error("No reconciliation is awaiting a choice")]
    NoPendingReconciliation,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when operator input doesn't meet requirements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field or selection is missing.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed decimal amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Product is not in the last-fetched catalog snapshot.
    #[error("Product {product_id} is not in the current catalog")]
    NotInCatalog { product_id: i64 },

    /// Product has no line in the order being composed.
    #[error("Product {product_id} is not in this order")]
    NotInOrder { product_id: i64 },

    /// The order would imply more units than the stock snapshot holds.
    ///
    /// ## User Workflow
    /// ```text
    /// Order has 3 × Cola, stock snapshot says 5
    ///      │
    ///      ▼
    /// add_item(cola, 3) → cumulative 6
    ///      │
    ///      ▼
    /// StockExceeded { product: "Cola", available: 5, requested: 6 }
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    StockExceeded {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Order lines are fixed once the order exists server-side.
    #[error("Items of order {order_id} can no longer be changed")]
    ItemsLocked { order_id: i64 },

    /// The total of a newly composed order is always derived from its items.
    #[error("The total of a new order is derived from its items")]
    TotalDerived,

    /// Order has reached the maximum number of lines.
    #[error("An order cannot have more than {max} lines")]
    TooManyLines { max: usize },

    /// A sale may only be recorded against a shipped order.
    #[error("Order {order_id} is {status}, only shipped orders can be sold")]
    OrderNotShipped { order_id: i64, status: String },

    /// Deleting the order would orphan its sale.
    #[error("Order {order_id} is referenced by sale {sale_id} and cannot be deleted")]
    OrderHasSale { order_id: i64, sale_id: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_exceeded_message() {
        let err = ValidationError::StockExceeded {
            product: "Cola".to_string(),
            available: 5,
            requested: 6,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Cola: available 5, requested 6"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer".to_string(),
        };
        assert_eq!(err.to_string(), "customer is required");

        let err = ValidationError::OrderNotShipped {
            order_id: 7,
            status: "Pendente".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Order 7 is Pendente, only shipped orders can be sold"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::TotalDerived;
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
