//! # Order Desk
//!
//! Order-side remote operations: status changes, composer submission and
//! deletion.
//!
//! ## Rules
//! - `set_status` sends a partial update carrying only the status. Items,
//!   customer and total are left as the store has them.
//! - An order with a recorded sale cannot be deleted. Delete the sale first.

use std::sync::Arc;

use stockroom_core::{ComposerMode, Order, OrderComposer, OrderId, OrderStatus, ValidationError};
use tracing::{debug, info, warn};

use crate::error::ClientResult;
use crate::store::RemoteStore;

/// Remote operations on orders.
#[derive(Clone)]
pub struct OrderDesk {
    store: Arc<dyn RemoteStore>,
}

impl OrderDesk {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        OrderDesk { store }
    }

    /// Changes an order's status with a single partial update.
    ///
    /// ## Example
    /// ```text
    /// PUT /pedidos/42   { "status": "Entregue" }
    /// ```
    pub async fn set_status(&self, order_id: OrderId, status: OrderStatus) -> ClientResult<()> {
        debug!(order_id, status = %status, "Updating order status");

        match self.store.update_order_status(order_id, status).await {
            Ok(()) => {
                info!(order_id, status = %status, "Order status updated");
                Ok(())
            }
            Err(e) => {
                warn!(order_id, status = %status, error = %e, "Order status update failed");
                Err(e)
            }
        }
    }

    /// Sends the composer's content: a create in `New` mode, a partial
    /// update in `Editing` mode.
    pub async fn submit(&self, composer: &OrderComposer) -> ClientResult<Order> {
        match composer.mode() {
            ComposerMode::New => {
                let request = composer.new_order_request()?;
                debug!(
                    customer_id = request.customer_id,
                    lines = request.items.len(),
                    total = %request.total,
                    "Creating order"
                );
                let order = self.store.create_order(&request).await?;
                info!(order_id = order.id, total = %order.total, "Order created");
                Ok(order)
            }
            ComposerMode::Editing { .. } => {
                let (order_id, patch) = composer.update_request()?;
                debug!(order_id, ?patch, "Updating order");
                let order = self.store.update_order(order_id, &patch).await?;
                info!(order_id, status = %order.status, "Order updated");
                Ok(order)
            }
        }
    }

    pub async fn get_order(&self, order_id: OrderId) -> ClientResult<Order> {
        self.store.get_order(order_id).await
    }

    pub async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        self.store.list_orders().await
    }

    /// Deletes an order that has no sale.
    ///
    /// ## Errors
    /// `OrderHasSale` if any sale references the order. No delete is sent.
    pub async fn delete_order(&self, order_id: OrderId) -> ClientResult<()> {
        let sales = self.store.list_sales().await?;
        if let Some(sale) = sales.iter().find(|s| s.order_id == order_id) {
            warn!(order_id, sale_id = sale.id, "Refusing to delete order with a sale");
            return Err(ValidationError::OrderHasSale {
                order_id,
                sale_id: sale.id,
            }
            .into());
        }

        self.store.delete_order(order_id).await?;
        info!(order_id, "Order deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Operation;
    use crate::memory::MemoryStore;
    use chrono::Utc;
    use stockroom_core::{CustomerRef, Money, PaymentMethod, Product, Sale};

    fn setup() -> (Arc<MemoryStore>, OrderDesk) {
        let store = Arc::new(MemoryStore::new());
        store.add_customer(1, "Bar do Zé");
        store.add_product(Product::new(10, "Cola", Money::from_cents(299), 5));
        store.add_product(Product::new(11, "Water", Money::from_cents(149), 20));
        let desk = OrderDesk::new(store.clone());
        (store, desk)
    }

    fn composer_with_cola(store: &MemoryStore) -> OrderComposer {
        let mut composer = OrderComposer::new();
        composer.load_catalog(&[store.product(10).unwrap(), store.product(11).unwrap()]);
        composer.set_customer(CustomerRef {
            id: 1,
            name: "Bar do Zé".to_string(),
        });
        composer.add_item(10, 2).unwrap();
        composer.add_item(11, 3).unwrap();
        composer
    }

    #[tokio::test]
    async fn test_submit_new_order() {
        let (store, desk) = setup();
        let composer = composer_with_cola(&store);

        let order = desk.submit(&composer).await.unwrap();

        assert_eq!(order.total, Money::from_cents(1045));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 2);
        assert_eq!(store.product(10).unwrap().stock, 3);
    }

    #[tokio::test]
    async fn test_submit_edit_sends_partial_update() {
        let (store, desk) = setup();
        let order = desk.submit(&composer_with_cola(&store)).await.unwrap();

        let mut composer = OrderComposer::edit(&order);
        composer.set_status(OrderStatus::Processing);
        store.clear_operations();

        let updated = desk.submit(&composer).await.unwrap();

        assert_eq!(updated.status, OrderStatus::Processing);
        assert_eq!(updated.items, order.items);
        assert_eq!(store.operations(), vec![Operation::UpdateOrder]);
    }

    #[tokio::test]
    async fn test_submit_without_customer_makes_no_call() {
        let (store, desk) = setup();
        let composer = OrderComposer::new();

        let err = desk.submit(&composer).await.unwrap_err();

        assert!(err.is_validation());
        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn test_set_status_is_one_call() {
        let (store, desk) = setup();
        let order = desk.submit(&composer_with_cola(&store)).await.unwrap();
        store.clear_operations();

        desk.set_status(order.id, OrderStatus::Shipped).await.unwrap();

        assert_eq!(store.operations(), vec![Operation::UpdateOrderStatus]);
        assert_eq!(store.order(order.id).unwrap().status, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn test_delete_order_with_sale_is_refused() {
        let (store, desk) = setup();
        let order = desk.submit(&composer_with_cola(&store)).await.unwrap();
        store.insert_sale(Sale {
            id: 90,
            order_id: order.id,
            staff_id: None,
            amount: order.total,
            payment_method: Some(PaymentMethod::Pix),
            sold_at: Utc::now(),
        });

        let err = desk.delete_order(order.id).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(store.count(Operation::DeleteOrder), 0);
        assert!(store.order(order.id).is_some());
    }

    #[tokio::test]
    async fn test_delete_order_without_sale() {
        let (store, desk) = setup();
        let order = desk.submit(&composer_with_cola(&store)).await.unwrap();

        desk.delete_order(order.id).await.unwrap();

        assert!(store.order(order.id).is_none());
    }
}
