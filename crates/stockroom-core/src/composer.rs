//! # Order Composer
//!
//! Builds an order's line-item set against the last-fetched catalog snapshot.
//!
//! ## Composer Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Order Composer Operations                            │
//! │                                                                         │
//! │  Operator Action          Composer Call            State Change         │
//! │  ───────────────          ─────────────            ────────────         │
//! │                                                                         │
//! │  Search products ────────► load_catalog() ───────► snapshot replaced    │
//! │                                                                         │
//! │  Click Product ──────────► add_item() ───────────► merge or push line   │
//! │                                                                         │
//! │  Change Quantity ────────► set_item_quantity() ──► items[i].qty = n     │
//! │                                                                         │
//! │  Click Remove ───────────► remove_item() ────────► line dropped         │
//! │                                                                         │
//! │  Save ───────────────────► new_order_request() ──► NewOrder payload     │
//! │                            update_request()        OrderPatch payload   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by product id (adding the same product merges)
//! - In `New` mode, `total() == compute_total()` at all times
//! - No line's quantity exceeds the last stock figure seen for its product
//! - A failed operation leaves the composer unchanged
//!
//! ## Stale Stock
//! The snapshot is never refreshed behind the operator's back. A long-idle
//! session may submit against an old figure; the remote store has the final
//! word on stock.

use std::collections::HashMap;

use crate::error::ValidationError;
use crate::money::Money;
use crate::status::OrderStatus;
use crate::types::{CustomerRef, NewOrder, Order, OrderId, OrderItem, OrderPatch, Product, ProductId};
use crate::validation::{validate_order_size, validate_quantity, ValidationResult};

// =============================================================================
// Composer Mode
// =============================================================================

/// Whether the composer holds a fresh order or an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerMode {
    /// Not yet persisted. Items are editable, total is derived.
    New,
    /// Opened from a stored order. Items are fixed server-side; customer,
    /// status and total stay editable.
    Editing { order_id: OrderId },
}

// =============================================================================
// Order Composer
// =============================================================================

/// The order being composed or edited.
#[derive(Debug, Clone)]
pub struct OrderComposer {
    mode: ComposerMode,
    customer: Option<CustomerRef>,
    status: OrderStatus,
    items: Vec<OrderItem>,
    /// Manual total, only ever set in `Editing` mode.
    total_override: Option<Money>,
    catalog: Vec<Product>,
    /// Last stock figure seen per product, kept across catalog reloads.
    known_stock: HashMap<ProductId, i64>,
}

impl OrderComposer {
    /// Creates an empty composer for a new order.
    pub fn new() -> Self {
        OrderComposer {
            mode: ComposerMode::New,
            customer: None,
            status: OrderStatus::Pending,
            items: Vec::new(),
            total_override: None,
            catalog: Vec::new(),
            known_stock: HashMap::new(),
        }
    }

    /// Opens a stored order for editing.
    ///
    /// The stored total becomes the editable total, even if it no longer
    /// matches the items.
    pub fn edit(order: &Order) -> Self {
        OrderComposer {
            mode: ComposerMode::Editing { order_id: order.id },
            customer: Some(order.customer.clone()),
            status: order.status,
            items: order.items.clone(),
            total_override: Some(order.total),
            catalog: Vec::new(),
            known_stock: HashMap::new(),
        }
    }

    pub fn mode(&self) -> ComposerMode {
        self.mode
    }

    pub fn customer(&self) -> Option<&CustomerRef> {
        self.customer.as_ref()
    }

    pub fn set_customer(&mut self, customer: CustomerRef) {
        self.customer = Some(customer);
    }

    pub fn clear_customer(&mut self) {
        self.customer = None;
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Sets the status carried by the next save. No transition guard.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    /// Replaces the catalog snapshot with the latest product search result.
    pub fn load_catalog(&mut self, products: &[Product]) {
        for product in products {
            self.known_stock.insert(product.id, product.stock);
        }
        self.catalog = products.to_vec();
    }

    /// Finds a product in the current snapshot.
    pub fn find_product(&self, product_id: ProductId) -> Option<&Product> {
        self.catalog.iter().find(|p| p.id == product_id)
    }

    // =========================================================================
    // Line Items
    // =========================================================================

    /// Adds a product or increases its quantity if already present.
    ///
    /// ## Behavior
    /// - Product already in the order: quantities are summed and the sum is
    ///   checked against stock
    /// - Product not in the order: a new line is appended with the current
    ///   name and unit price frozen
    ///
    /// ## Errors
    /// - `ItemsLocked` when editing a stored order
    /// - `MustBePositive` / `OutOfRange` for a bad quantity
    /// - `NotInCatalog` if the product is not in the snapshot
    /// - `StockExceeded` if the cumulative quantity passes the stock figure
    pub fn add_item(&mut self, product_id: ProductId, quantity: i64) -> ValidationResult<()> {
        self.ensure_items_mutable()?;
        validate_quantity(quantity)?;

        let product = self
            .find_product(product_id)
            .ok_or(ValidationError::NotInCatalog { product_id })?;

        let existing = self.line_quantity(product_id);
        let requested = existing + quantity;
        validate_quantity(requested)?;

        if !product.can_supply(requested) {
            return Err(ValidationError::StockExceeded {
                product: product.name.clone(),
                available: product.stock,
                requested,
            });
        }

        if existing == 0 {
            validate_order_size(self.items.len())?;
            let line = OrderItem {
                product_id: product.id,
                product_name: product.name.clone(),
                quantity,
                unit_price: product.unit_price,
            };
            self.items.push(line);
        } else if let Some(line) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            line.quantity = requested;
        }

        Ok(())
    }

    /// Removes a product's line. Absent products are a no-op.
    pub fn remove_item(&mut self, product_id: ProductId) -> ValidationResult<()> {
        self.ensure_items_mutable()?;
        self.items.retain(|i| i.product_id != product_id);
        Ok(())
    }

    /// Overwrites the quantity of an existing line.
    ///
    /// The new figure is checked against the last stock seen for the product,
    /// even if it has since dropped out of the current snapshot.
    pub fn set_item_quantity(&mut self, product_id: ProductId, quantity: i64) -> ValidationResult<()> {
        self.ensure_items_mutable()?;
        validate_quantity(quantity)?;

        let available = self.known_stock.get(&product_id).copied();
        let line = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or(ValidationError::NotInOrder { product_id })?;

        if let Some(available) = available {
            if quantity > available {
                return Err(ValidationError::StockExceeded {
                    product: line.product_name.clone(),
                    available,
                    requested: quantity,
                });
            }
        }

        line.quantity = quantity;
        Ok(())
    }

    fn line_quantity(&self, product_id: ProductId) -> i64 {
        self.items
            .iter()
            .find(|i| i.product_id == product_id)
            .map_or(0, |i| i.quantity)
    }

    fn ensure_items_mutable(&self) -> ValidationResult<()> {
        match self.mode {
            ComposerMode::New => Ok(()),
            ComposerMode::Editing { order_id } => Err(ValidationError::ItemsLocked { order_id }),
        }
    }

    // =========================================================================
    // Totals
    // =========================================================================

    /// Sum of `unit_price × quantity` over all lines.
    pub fn compute_total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// The total that will be saved: the manual one when editing, otherwise
    /// the derived one.
    pub fn total(&self) -> Money {
        self.total_override.unwrap_or_else(|| self.compute_total())
    }

    /// Overrides the total of a stored order.
    ///
    /// ## Rules
    /// - Only in `Editing` mode; a new order's total is always derived
    /// - Must not be negative
    pub fn set_total(&mut self, total: Money) -> ValidationResult<()> {
        if self.mode == ComposerMode::New {
            return Err(ValidationError::TotalDerived);
        }
        if total.is_negative() {
            return Err(ValidationError::OutOfRange {
                field: "total".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
        self.total_override = Some(total);
        Ok(())
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Builds the create payload for a new order.
    ///
    /// An order with no items is accepted; a customer is not.
    pub fn new_order_request(&self) -> ValidationResult<NewOrder> {
        if let ComposerMode::Editing { order_id } = self.mode {
            return Err(ValidationError::ItemsLocked { order_id });
        }
        let customer = self.customer.as_ref().ok_or_else(|| ValidationError::Required {
            field: "customer".to_string(),
        })?;

        Ok(NewOrder {
            customer_id: customer.id,
            status: self.status,
            total: self.compute_total(),
            items: self.items.clone(),
        })
    }

    /// Builds the partial update for a stored order: customer, status and
    /// total only.
    pub fn update_request(&self) -> ValidationResult<(OrderId, OrderPatch)> {
        let order_id = match self.mode {
            ComposerMode::Editing { order_id } => order_id,
            ComposerMode::New => {
                return Err(ValidationError::Required {
                    field: "order".to_string(),
                })
            }
        };
        let customer = self.customer.as_ref().ok_or_else(|| ValidationError::Required {
            field: "customer".to_string(),
        })?;

        let patch = OrderPatch {
            customer_id: Some(customer.id),
            status: Some(self.status),
            total: Some(self.total()),
        };
        Ok((order_id, patch))
    }
}

impl Default for OrderComposer {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
