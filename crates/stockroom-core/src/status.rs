//! # Status Vocabulary
//!
//! The order lifecycle states and the closed payment-method vocabulary,
//! each with an exhaustive mapping to the strings the remote store speaks.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Pending ──► Processing ──► Shipped ──► Delivered (terminal)           │
//! │      │            │             │                                       │
//! │      └────────────┴─────────────┴──────► Cancelled (terminal)           │
//! │                                                                         │
//! │   Wire:  Pendente   Processando   Enviado   Entregue   Cancelado        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - No transition guard is enforced here. Operators may set any status; the
//!   remote store is the authority.
//! - A wire value outside the table is rejected, never passed through.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Order Status
// =============================================================================

/// The fulfillment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order recorded, nothing done yet.
    Pending,
    /// Order is being picked and packed.
    Processing,
    /// Order left the warehouse. Only shipped orders can be sold.
    Shipped,
    /// Order reached the customer. Set automatically when a sale is recorded.
    Delivered,
    /// Order was called off.
    Cancelled,
}

impl OrderStatus {
    /// All states in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Parses a status string received from the remote store.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::status::OrderStatus;
    ///
    /// assert_eq!(OrderStatus::from_wire("Enviado").unwrap(), OrderStatus::Shipped);
    /// assert!(OrderStatus::from_wire("Shipped").is_err());
    /// ```
    pub fn from_wire(value: &str) -> Result<OrderStatus, CoreError> {
        match value {
            "Pendente" => Ok(OrderStatus::Pending),
            "Processando" => Ok(OrderStatus::Processing),
            "Enviado" => Ok(OrderStatus::Shipped),
            "Entregue" => Ok(OrderStatus::Delivered),
            "Cancelado" => Ok(OrderStatus::Cancelled),
            other => Err(CoreError::UnknownOrderStatus(other.to_string())),
        }
    }

    /// Parses an optional status; missing or blank reads as `Pending`.
    pub fn from_wire_or_pending(value: Option<&str>) -> Result<OrderStatus, CoreError> {
        match value.map(str::trim) {
            None | Some("") => Ok(OrderStatus::Pending),
            Some(v) => OrderStatus::from_wire(v),
        }
    }

    /// The string the remote store expects for this status.
    pub const fn as_wire(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendente",
            OrderStatus::Processing => "Processando",
            OrderStatus::Shipped => "Enviado",
            OrderStatus::Delivered => "Entregue",
            OrderStatus::Cancelled => "Cancelado",
        }
    }

    /// Delivered and Cancelled are terminal.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid for a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    BankTransfer,
    Pix,
    Cheque,
}

impl PaymentMethod {
    /// All methods in the order the sale form offers them.
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::BankTransfer,
        PaymentMethod::Pix,
        PaymentMethod::Cheque,
    ];

    pub fn from_wire(value: &str) -> Result<PaymentMethod, CoreError> {
        match value {
            "Dinheiro" => Ok(PaymentMethod::Cash),
            "Cartão de Crédito" => Ok(PaymentMethod::CreditCard),
            "Cartão de Débito" => Ok(PaymentMethod::DebitCard),
            "Transferência Bancária" => Ok(PaymentMethod::BankTransfer),
            "PIX" => Ok(PaymentMethod::Pix),
            "Cheque" => Ok(PaymentMethod::Cheque),
            other => Err(CoreError::UnknownPaymentMethod(other.to_string())),
        }
    }

    pub const fn as_wire(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::CreditCard => "Cartão de Crédito",
            PaymentMethod::DebitCard => "Cartão de Débito",
            PaymentMethod::BankTransfer => "Transferência Bancária",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Cheque => "Cheque",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table_is_bijective() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_wire(status.as_wire()).unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = OrderStatus::from_wire("Devolvido").unwrap_err();
        assert_eq!(err, CoreError::UnknownOrderStatus("Devolvido".to_string()));
        // Case matters on the wire.
        assert!(OrderStatus::from_wire("enviado").is_err());
    }

    #[test]
    fn test_missing_status_reads_as_pending() {
        assert_eq!(
            OrderStatus::from_wire_or_pending(None).unwrap(),
            OrderStatus::Pending
        );
        assert_eq!(
            OrderStatus::from_wire_or_pending(Some("  ")).unwrap(),
            OrderStatus::Pending
        );
        assert_eq!(
            OrderStatus::from_wire_or_pending(Some("Entregue")).unwrap(),
            OrderStatus::Delivered
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
    }

    #[test]
    fn test_payment_method_table() {
        for method in PaymentMethod::ALL {
            assert_eq!(PaymentMethod::from_wire(method.as_wire()).unwrap(), method);
        }
        assert!(PaymentMethod::from_wire("Bitcoin").is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Delivered).unwrap();
        assert_eq!(json, "\"delivered\"");
        let json = serde_json::to_string(&PaymentMethod::BankTransfer).unwrap();
        assert_eq!(json, "\"bank_transfer\"");
    }
}
