//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  items[]        │◄──│  order_id (1:1) │       │
//! │  │  name           │   │  customer       │   │  amount         │       │
//! │  │  unit_price     │   │  total          │   │  payment_method │       │
//! │  │  stock          │   │  status         │   │  staff_id?      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Requests (outbound):  NewOrder, OrderPatch, NewSale, SalePatch         │
//! │  Read models:          SaleListing, StaffIdentity                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity is keyed by the integer id the remote store assigns. The
//! console never invents ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::status::{OrderStatus, PaymentMethod};

pub type ProductId = i64;
pub type CustomerId = i64;
pub type OrderId = i64;
pub type SaleId = i64;
pub type StaffId = i64;

// =============================================================================
// Product
// =============================================================================

/// A product as returned by the last catalog search.
///
/// `stock` is a snapshot. The remote store may already hold a different
/// figure; it performs its own check when the order is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_price: Money,
    /// Units available when the catalog was fetched.
    pub stock: i64,
}

impl Product {
    /// Creates a product with no description or category.
    pub fn new(id: ProductId, name: impl Into<String>, unit_price: Money, stock: i64) -> Self {
        Product {
            id,
            name: name.into(),
            description: None,
            category: None,
            unit_price,
            stock,
        }
    }

    /// Checks whether `quantity` units fit in the stock snapshot.
    #[inline]
    pub fn can_supply(&self, quantity: i64) -> bool {
        quantity <= self.stock
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer reference: id plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerRef {
    pub id: CustomerId,
    pub name: String,
}

// =============================================================================
// Order Item
// =============================================================================

/// A line of an order.
/// Uses snapshot pattern to freeze product data at add time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub product_id: ProductId,
    /// Product name at add time (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price at add time (frozen, never re-fetched).
    pub unit_price: Money,
}

impl OrderItem {
    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order as stored remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: OrderId,
    pub customer: CustomerRef,
    pub items: Vec<OrderItem>,
    /// Derived from the items unless an operator overrode it while editing.
    pub total: Money,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub ordered_at: DateTime<Utc>,
}

impl Order {
    /// One-line description of the items, as shown in the sales table.
    ///
    /// ## Example
    /// `"Cola (x2), Water (x3)"`
    pub fn items_summary(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("{} (x{})", item.product_name, item.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Payload to create an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub total: Money,
    pub items: Vec<OrderItem>,
}

/// Partial update of an existing order. Items are never part of a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderPatch {
    pub customer_id: Option<CustomerId>,
    pub status: Option<OrderStatus>,
    pub total: Option<Money>,
}

impl OrderPatch {
    /// A patch that only changes the status.
    pub fn status(status: OrderStatus) -> Self {
        OrderPatch {
            status: Some(status),
            ..OrderPatch::default()
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// The financial record of payment collected against one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    pub id: SaleId,
    /// Immutable after creation.
    pub order_id: OrderId,
    pub staff_id: Option<StaffId>,
    pub amount: Money,
    pub payment_method: Option<PaymentMethod>,
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
}

impl Sale {
    /// Human-readable invoice number.
    ///
    /// ## Example
    /// Sale 42 → `INV-00042`
    pub fn invoice_number(&self) -> String {
        format!("INV-{:05}", self.id)
    }
}

/// Payload to create a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub order_id: OrderId,
    pub staff_id: Option<StaffId>,
    pub amount: Money,
    pub payment_method: PaymentMethod,
}

/// Partial update of a sale. The order link cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalePatch {
    pub amount: Option<Money>,
    pub payment_method: Option<PaymentMethod>,
}

/// A row of the sales table: the sale joined with what is known of its order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleListing {
    pub sale: Sale,
    pub customer_name: Option<String>,
    pub items_summary: Option<String>,
    /// Status of the linked order at fetch time; `None` if it could not be
    /// fetched.
    pub order_status: Option<OrderStatus>,
}

impl SaleListing {
    /// Builds a row from a sale and its order, if the order was reachable.
    pub fn new(sale: Sale, order: Option<&Order>) -> Self {
        SaleListing {
            sale,
            customer_name: order.map(|o| o.customer.name.clone()),
            items_summary: order.map(Order::items_summary),
            order_status: order.map(|o| o.status),
        }
    }
}

// =============================================================================
// Staff
// =============================================================================

/// The authenticated staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StaffIdentity {
    pub id: StaffId,
    pub email: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_order() -> Order {
        Order {
            id: 7,
            customer: CustomerRef {
                id: 3,
                name: "Bar do Zé".to_string(),
            },
            items: vec![
                OrderItem {
                    product_id: 1,
                    product_name: "Cola".to_string(),
                    quantity: 2,
                    unit_price: Money::from_cents(299),
                },
                OrderItem {
                    product_id: 2,
                    product_name: "Water".to_string(),
                    quantity: 3,
                    unit_price: Money::from_cents(149),
                },
            ],
            total: Money::from_cents(1045),
            status: OrderStatus::Shipped,
            ordered_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_items_summary() {
        assert_eq!(sample_order().items_summary(), "Cola (x2), Water (x3)");
    }

    #[test]
    fn test_invoice_number_is_zero_padded() {
        let sale = Sale {
            id: 42,
            order_id: 7,
            staff_id: None,
            amount: Money::from_cents(1045),
            payment_method: Some(PaymentMethod::Pix),
            sold_at: Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap(),
        };
        assert_eq!(sale.invoice_number(), "INV-00042");
    }

    #[test]
    fn test_listing_without_order_is_degraded() {
        let order = sample_order();
        let sale = Sale {
            id: 1,
            order_id: order.id,
            staff_id: Some(9),
            amount: order.total,
            payment_method: None,
            sold_at: order.ordered_at,
        };

        let full = SaleListing::new(sale.clone(), Some(&order));
        assert_eq!(full.customer_name.as_deref(), Some("Bar do Zé"));
        assert_eq!(full.order_status, Some(OrderStatus::Shipped));

        let degraded = SaleListing::new(sale, None);
        assert!(degraded.customer_name.is_none());
        assert!(degraded.order_status.is_none());
    }

    #[test]
    fn test_status_patch() {
        let patch = OrderPatch::status(OrderStatus::Delivered);
        assert_eq!(patch.status, Some(OrderStatus::Delivered));
        assert!(patch.customer_id.is_none());
        assert!(patch.total.is_none());
    }
}
