//! # Sale Draft
//!
//! The sale form before it is submitted.
//!
//! ## Sale Form Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Search shipped orders ──► for_order(&order)                            │
//! │                               │  amount ← order.total                   │
//! │                               ▼                                         │
//! │  Adjust amount ──────────► set_amount()                                 │
//! │  Pick payment ───────────► set_payment_method()                         │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  Save ───────────────────► validate() ──► NewSale                       │
//! │                               │                                         │
//! │                               ├── no order?        → Required           │
//! │                               ├── order not Shipped → OrderNotShipped   │
//! │                               ├── amount <= 0?     → MustBePositive     │
//! │                               └── no payment?      → Required           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The shipped check uses the status the order had when it was selected.
//! No extra remote call is made to confirm it.

use crate::error::ValidationError;
use crate::money::Money;
use crate::status::{OrderStatus, PaymentMethod};
use crate::types::{NewSale, Order, OrderId, SalePatch, StaffId};
use crate::validation::{validate_amount, ValidationResult};

/// The order a draft is tied to, as it looked when selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedOrder {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total: Money,
}

/// An unsubmitted sale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleDraft {
    order: Option<SelectedOrder>,
    amount: Option<Money>,
    payment_method: Option<PaymentMethod>,
    staff_id: Option<StaffId>,
}

impl SaleDraft {
    /// Creates an empty draft.
    pub fn new() -> Self {
        SaleDraft::default()
    }

    /// Creates a draft for an order, amount initialised from its total.
    pub fn for_order(order: &Order) -> Self {
        let mut draft = SaleDraft::new();
        draft.select_order(order);
        draft
    }

    /// Selects an order and resets the amount to its total.
    pub fn select_order(&mut self, order: &Order) {
        self.order = Some(SelectedOrder {
            id: order.id,
            status: order.status,
            total: order.total,
        });
        self.amount = Some(order.total);
    }

    pub fn order(&self) -> Option<&SelectedOrder> {
        self.order.as_ref()
    }

    pub fn amount(&self) -> Option<Money> {
        self.amount
    }

    /// The amount is independent from the order total once set.
    pub fn set_amount(&mut self, amount: Money) {
        self.amount = Some(amount);
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = Some(method);
    }

    pub fn staff_id(&self) -> Option<StaffId> {
        self.staff_id
    }

    pub fn set_staff(&mut self, staff_id: Option<StaffId>) {
        self.staff_id = staff_id;
    }

    /// Checks the draft and produces the create payload.
    pub fn validate(&self) -> ValidationResult<NewSale> {
        let order = self.order.ok_or_else(|| ValidationError::Required {
            field: "order".to_string(),
        })?;

        if order.status != OrderStatus::Shipped {
            return Err(ValidationError::OrderNotShipped {
                order_id: order.id,
                status: order.status.as_wire().to_string(),
            });
        }

        let amount = self.amount.ok_or_else(|| ValidationError::Required {
            field: "amount".to_string(),
        })?;
        validate_amount("amount", amount)?;

        let payment_method = self.payment_method.ok_or_else(|| ValidationError::Required {
            field: "payment method".to_string(),
        })?;

        Ok(NewSale {
            order_id: order.id,
            staff_id: self.staff_id,
            amount,
            payment_method,
        })
    }
}

/// Checks a sale update. Only the amount carries a rule.
pub fn validate_patch(patch: &SalePatch) -> ValidationResult<()> {
    if let Some(amount) = patch.amount {
        validate_amount("amount", amount)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CustomerRef;
    use chrono::Utc;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: 31,
            customer: CustomerRef {
                id: 2,
                name: "Adega Norte".to_string(),
            },
            items: Vec::new(),
            total: Money::from_cents(1045),
            status,
            ordered_at: Utc::now(),
        }
    }

    #[test]
    fn test_amount_initialised_from_total() {
        let draft = SaleDraft::for_order(&order(OrderStatus::Shipped));
        assert_eq!(draft.amount(), Some(Money::from_cents(1045)));
    }

    #[test]
    fn test_validate_shipped_order() {
        let mut draft = SaleDraft::for_order(&order(OrderStatus::Shipped));
        draft.set_amount(Money::from_cents(1000));
        draft.set_payment_method(PaymentMethod::Pix);
        draft.set_staff(Some(5));

        let sale = draft.validate().unwrap();
        assert_eq!(sale.order_id, 31);
        assert_eq!(sale.amount.cents(), 1000);
        assert_eq!(sale.payment_method, PaymentMethod::Pix);
        assert_eq!(sale.staff_id, Some(5));
    }

    #[test]
    fn test_order_must_be_shipped() {
        let mut draft = SaleDraft::for_order(&order(OrderStatus::Processing));
        draft.set_payment_method(PaymentMethod::Cash);

        assert_eq!(
            draft.validate(),
            Err(ValidationError::OrderNotShipped {
                order_id: 31,
                status: "Processando".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_selections() {
        let draft = SaleDraft::new();
        assert_eq!(
            draft.validate(),
            Err(ValidationError::Required {
                field: "order".to_string()
            })
        );

        let draft = SaleDraft::for_order(&order(OrderStatus::Shipped));
        assert_eq!(
            draft.validate(),
            Err(ValidationError::Required {
                field: "payment method".to_string()
            })
        );
    }

    #[test]
    fn test_amount_must_be_positive() {
        let mut draft = SaleDraft::for_order(&order(OrderStatus::Shipped));
        draft.set_payment_method(PaymentMethod::Cash);
        draft.set_amount(Money::zero());

        assert!(matches!(
            draft.validate(),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_validate_patch() {
        assert!(validate_patch(&SalePatch::default()).is_ok());
        assert!(validate_patch(&SalePatch {
            amount: Some(Money::from_cents(-10)),
            payment_method: None,
        })
        .is_err());
    }
}
