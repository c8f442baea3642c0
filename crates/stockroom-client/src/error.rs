//! # Client Error Types
//!
//! Error types for remote operations.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Local          │  │   Remote        │  │     Coupled             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Validation     │  │  Remote         │  │  PartialSuccess         │ │
//! │  │  Core           │  │  Unauthorized   │  │  (sale created,         │ │
//! │  │  InvalidConfig  │  │  InvalidResponse│  │   status update failed) │ │
//! │  │  SessionStorage │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is fatal. Every failure is recoverable by the operator
//! retrying or correcting input, and no remote call is ever retried
//! automatically.

use std::fmt;

use serde_json::Value;
use stockroom_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

// =============================================================================
// Operation Tags
// =============================================================================

/// The remote operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    FetchIdentity,
    SearchProducts,
    SearchCustomers,
    SearchOrders,
    GetOrder,
    ListOrders,
    CreateOrder,
    UpdateOrder,
    UpdateOrderStatus,
    DeleteOrder,
    ListSales,
    CreateSale,
    UpdateSale,
    DeleteSale,
}

impl Operation {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Operation::Login => "login",
            Operation::FetchIdentity => "fetch_identity",
            Operation::SearchProducts => "search_products",
            Operation::SearchCustomers => "search_customers",
            Operation::SearchOrders => "search_orders",
            Operation::GetOrder => "get_order",
            Operation::ListOrders => "list_orders",
            Operation::CreateOrder => "create_order",
            Operation::UpdateOrder => "update_order",
            Operation::UpdateOrderStatus => "update_order_status",
            Operation::DeleteOrder => "delete_order",
            Operation::ListSales => "list_sales",
            Operation::CreateSale => "create_sale",
            Operation::UpdateSale => "update_sale",
            Operation::DeleteSale => "delete_sale",
        }
    }

    /// Message used when the store's error body carries nothing readable.
    pub const fn fallback_message(&self) -> &'static str {
        match self {
            Operation::Login => "Login failed",
            Operation::FetchIdentity => "Could not load the signed-in user",
            Operation::SearchProducts => "Could not search products",
            Operation::SearchCustomers => "Could not search customers",
            Operation::SearchOrders => "Could not search orders",
            Operation::GetOrder => "Could not load the order",
            Operation::ListOrders => "Could not load orders",
            Operation::CreateOrder => "Could not create the order",
            Operation::UpdateOrder => "Could not update the order",
            Operation::UpdateOrderStatus => "Could not update the order status",
            Operation::DeleteOrder => "Could not delete the order",
            Operation::ListSales => "Could not load sales",
            Operation::CreateSale => "Could not record the sale",
            Operation::UpdateSale => "Could not update the sale",
            Operation::DeleteSale => "Could not delete the sale",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Client Error
// =============================================================================

/// Error type covering every failure a console operation can report.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Local Errors
    // =========================================================================
    /// Bad input caught before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Domain rule violated (unknown vocabulary, no pending prompt).
    #[error(transparent)]
    Core(CoreError),

    /// Invalid console configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Session token could not be read or written.
    #[error("Session storage error: {0}")]
    SessionStorage(String),

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// The store rejected the call or could not be reached.
    #[error("{operation} failed: {message}")]
    Remote {
        operation: Operation,
        /// HTTP status, `None` if no response arrived.
        status: Option<u16>,
        message: String,
    },

    /// The store answered 401. The session has been cleared.
    #[error("{operation} failed: session expired, please sign in again")]
    Unauthorized { operation: Operation },

    /// The store answered with a body that cannot be understood.
    #[error("{operation} returned an invalid response: {reason}")]
    InvalidResponse { operation: Operation, reason: String },

    // =========================================================================
    // Coupled Errors
    // =========================================================================
    /// The first half of a coupled operation succeeded, the second failed.
    #[error("{completed} succeeded but {failed} failed: {message}")]
    PartialSuccess {
        completed: Operation,
        failed: Operation,
        message: String,
    },
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => ClientError::Validation(v),
            other => ClientError::Core(other),
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::InvalidConfig(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::InvalidConfig(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidConfig(format!("invalid URL: {}", err))
    }
}

// =============================================================================
// Constructors & Categorization
// =============================================================================

impl ClientError {
    /// A failed response, message taken from its body.
    pub fn remote(operation: Operation, status: u16, body: &str) -> Self {
        ClientError::Remote {
            operation,
            status: Some(status),
            message: describe_failure(operation, body),
        }
    }

    /// The request never got a response.
    pub fn unreachable(operation: Operation, reason: impl fmt::Display) -> Self {
        ClientError::Remote {
            operation,
            status: None,
            message: format!("{}: {}", operation.fallback_message(), reason),
        }
    }

    /// The operation the error belongs to, if it came from the store.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            ClientError::Remote { operation, .. }
            | ClientError::Unauthorized { operation }
            | ClientError::InvalidResponse { operation, .. } => Some(*operation),
            ClientError::PartialSuccess { failed, .. } => Some(*failed),
            _ => None,
        }
    }

    /// Returns true if the error was raised before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    /// Returns true if a remote mutation did happen despite the error.
    pub fn is_partial_success(&self) -> bool {
        matches!(self, ClientError::PartialSuccess { .. })
    }

    /// Returns true if the operator must sign in again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }
}

// =============================================================================
// Error Body Parsing
// =============================================================================

/// Turns a store error body into one operator-facing message.
///
/// ## Accepted Shapes
/// ```text
/// {"detail": [{"msg": "a"}, {"msg": "b"}]}  →  "a, b"
/// {"detail": "Pedido não encontrado"}       →  "Pedido não encontrado"
/// anything else                             →  operation fallback
/// ```
pub fn describe_failure(operation: Operation, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned());

    match detail {
        Some(Value::String(text)) if !text.trim().is_empty() => text,
        Some(Value::Array(entries)) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                operation.fallback_message().to_string()
            } else {
                messages.join(", ")
            }
        }
        _ => operation.fallback_message().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_list_is_joined() {
        let body = r#"{"detail":[{"loc":["body","total"],"msg":"field required"},{"msg":"value is not a valid integer"}]}"#;
        assert_eq!(
            describe_failure(Operation::CreateOrder, body),
            "field required, value is not a valid integer"
        );
    }

    #[test]
    fn test_detail_string_is_used() {
        let body = r#"{"detail":"Estoque insuficiente"}"#;
        assert_eq!(
            describe_failure(Operation::CreateOrder, body),
            "Estoque insuficiente"
        );
    }

    #[test]
    fn test_unknown_shapes_fall_back() {
        assert_eq!(
            describe_failure(Operation::DeleteSale, "<html>502</html>"),
            "Could not delete the sale"
        );
        assert_eq!(
            describe_failure(Operation::DeleteSale, r#"{"error":"x"}"#),
            "Could not delete the sale"
        );
        assert_eq!(
            describe_failure(Operation::DeleteSale, r#"{"detail":[{"code":1}]}"#),
            "Could not delete the sale"
        );
    }

    #[test]
    fn test_core_validation_is_flattened() {
        let err: ClientError = CoreError::Validation(ValidationError::TotalDerived).into();
        assert!(err.is_validation());

        let err: ClientError = CoreError::NoPendingReconciliation.into();
        assert!(matches!(err, ClientError::Core(_)));
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::remote(Operation::CreateSale, 400, r#"{"detail":"Pedido inválido"}"#);
        assert_eq!(err.to_string(), "create_sale failed: Pedido inválido");
        assert_eq!(err.operation(), Some(Operation::CreateSale));

        let err = ClientError::PartialSuccess {
            completed: Operation::CreateSale,
            failed: Operation::UpdateOrderStatus,
            message: "timeout".to_string(),
        };
        assert!(err.is_partial_success());
        assert_eq!(
            err.to_string(),
            "create_sale succeeded but update_order_status failed: timeout"
        );
    }
}
