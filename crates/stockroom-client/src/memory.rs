//! # In-Memory Store
//!
//! A [`RemoteStore`] that keeps everything in process memory.
//!
//! Used by the test suites and by the `stockroom demo` command. Besides
//! storing data it records every operation it receives, and can be told to
//! fail the next call of a given operation or to hold a product search back
//! for a while.
//!
//! ```text
//! store.fail_next(Operation::UpdateOrderStatus);
//! recorder.create_sale(&draft).await   → sale stored, status update fails
//! store.count(Operation::UpdateOrderStatus) == 1
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use stockroom_core::{
    CustomerId, CustomerRef, NewOrder, NewSale, Order, OrderId, OrderPatch, OrderStatus, Product,
    ProductId, Sale, SaleId, SalePatch, StaffId, StaffIdentity,
};

use crate::error::{ClientError, ClientResult, Operation};
use crate::lock;
use crate::store::RemoteStore;

struct StaffAccount {
    email: String,
    password: String,
    identity: StaffIdentity,
}

#[derive(Default)]
struct MemoryState {
    products: BTreeMap<ProductId, Product>,
    customers: BTreeMap<CustomerId, CustomerRef>,
    orders: BTreeMap<OrderId, Order>,
    sales: BTreeMap<SaleId, Sale>,
    staff: Vec<StaffAccount>,
    signed_in: Option<StaffIdentity>,
    next_id: i64,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory remote store.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    operations: Mutex<Vec<Operation>>,
    failures: Mutex<Vec<Operation>>,
    search_delays: Mutex<HashMap<String, Duration>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    pub fn add_product(&self, product: Product) {
        let mut state = lock(&self.state);
        state.next_id = state.next_id.max(product.id);
        state.products.insert(product.id, product);
    }

    pub fn add_customer(&self, id: CustomerId, name: &str) {
        let mut state = lock(&self.state);
        state.next_id = state.next_id.max(id);
        state.customers.insert(
            id,
            CustomerRef {
                id,
                name: name.to_string(),
            },
        );
    }

    pub fn add_staff(&self, id: StaffId, email: &str, password: &str) {
        lock(&self.state).staff.push(StaffAccount {
            email: email.to_string(),
            password: password.to_string(),
            identity: StaffIdentity {
                id,
                email: email.to_string(),
            },
        });
    }

    pub fn insert_order(&self, order: Order) {
        let mut state = lock(&self.state);
        state.next_id = state.next_id.max(order.id);
        state.orders.insert(order.id, order);
    }

    pub fn insert_sale(&self, sale: Sale) {
        let mut state = lock(&self.state);
        state.next_id = state.next_id.max(sale.id);
        state.sales.insert(sale.id, sale);
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn order(&self, order_id: OrderId) -> Option<Order> {
        lock(&self.state).orders.get(&order_id).cloned()
    }

    pub fn sale(&self, sale_id: SaleId) -> Option<Sale> {
        lock(&self.state).sales.get(&sale_id).cloned()
    }

    pub fn product(&self, product_id: ProductId) -> Option<Product> {
        lock(&self.state).products.get(&product_id).cloned()
    }

    /// Every operation received, in order, including injected failures.
    pub fn operations(&self) -> Vec<Operation> {
        lock(&self.operations).clone()
    }

    pub fn count(&self, operation: Operation) -> usize {
        lock(&self.operations)
            .iter()
            .filter(|op| **op == operation)
            .count()
    }

    pub fn clear_operations(&self) {
        lock(&self.operations).clear();
    }

    // =========================================================================
    // Fault Injection
    // =========================================================================

    /// Makes the next call of `operation` fail with a 500.
    pub fn fail_next(&self, operation: Operation) {
        lock(&self.failures).push(operation);
    }

    /// Holds back product searches for `query` by `delay`.
    pub fn delay_search(&self, query: &str, delay: Duration) {
        lock(&self.search_delays).insert(query.to_string(), delay);
    }

    fn begin(&self, operation: Operation) -> ClientResult<()> {
        lock(&self.operations).push(operation);

        let mut failures = lock(&self.failures);
        if let Some(pos) = failures.iter().position(|op| *op == operation) {
            failures.remove(pos);
            return Err(ClientError::Remote {
                operation,
                status: Some(500),
                message: operation.fallback_message().to_string(),
            });
        }
        Ok(())
    }
}

fn rejected(operation: Operation, status: u16, message: impl Into<String>) -> ClientError {
    ClientError::Remote {
        operation,
        status: Some(status),
        message: message.into(),
    }
}

fn matches(haystack: &str, query: &str) -> bool {
    haystack.to_lowercase().contains(&query.to_lowercase())
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn login(&self, email: &str, password: &str) -> ClientResult<String> {
        self.begin(Operation::Login)?;
        let mut state = lock(&self.state);

        let identity = state
            .staff
            .iter()
            .find(|a| a.email == email && a.password == password)
            .map(|a| a.identity.clone())
            .ok_or_else(|| rejected(Operation::Login, 401, "Incorrect username or password"))?;

        let token = format!("memory-token-{}", identity.id);
        state.signed_in = Some(identity);
        Ok(token)
    }

    async fn fetch_identity(&self) -> ClientResult<StaffIdentity> {
        self.begin(Operation::FetchIdentity)?;
        lock(&self.state)
            .signed_in
            .clone()
            .ok_or(ClientError::Unauthorized {
                operation: Operation::FetchIdentity,
            })
    }

    async fn search_products(&self, query: &str, limit: usize) -> ClientResult<Vec<Product>> {
        self.begin(Operation::SearchProducts)?;

        let delay = lock(&self.search_delays).get(query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(lock(&self.state)
            .products
            .values()
            .filter(|p| query.is_empty() || matches(&p.name, query))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn search_customers(&self, query: &str) -> ClientResult<Vec<CustomerRef>> {
        self.begin(Operation::SearchCustomers)?;
        Ok(lock(&self.state)
            .customers
            .values()
            .filter(|c| matches(&c.name, query))
            .cloned()
            .collect())
    }

    async fn search_orders(
        &self,
        query: &str,
        status: Option<OrderStatus>,
        limit: usize,
    ) -> ClientResult<Vec<Order>> {
        self.begin(Operation::SearchOrders)?;
        Ok(lock(&self.state)
            .orders
            .values()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .filter(|o| matches(&o.customer.name, query) || o.id.to_string() == query)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_order(&self, order_id: OrderId) -> ClientResult<Order> {
        self.begin(Operation::GetOrder)?;
        lock(&self.state)
            .orders
            .get(&order_id)
            .cloned()
            .ok_or_else(|| rejected(Operation::GetOrder, 404, "Pedido não encontrado"))
    }

    async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        self.begin(Operation::ListOrders)?;
        Ok(lock(&self.state).orders.values().cloned().collect())
    }

    async fn create_order(&self, order: &NewOrder) -> ClientResult<Order> {
        self.begin(Operation::CreateOrder)?;
        let mut state = lock(&self.state);

        let customer = state
            .customers
            .get(&order.customer_id)
            .cloned()
            .ok_or_else(|| rejected(Operation::CreateOrder, 404, "Cliente não encontrado"))?;

        for item in &order.items {
            let product = state
                .products
                .get(&item.product_id)
                .ok_or_else(|| rejected(Operation::CreateOrder, 404, "Produto não encontrado"))?;
            if item.quantity > product.stock {
                return Err(rejected(
                    Operation::CreateOrder,
                    400,
                    format!("Estoque insuficiente para {}", product.name),
                ));
            }
        }
        for item in &order.items {
            if let Some(product) = state.products.get_mut(&item.product_id) {
                product.stock -= item.quantity;
            }
        }

        let created = Order {
            id: state.next_id(),
            customer,
            items: order.items.clone(),
            total: order.total,
            status: order.status,
            ordered_at: Utc::now(),
        };
        state.orders.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_order(&self, order_id: OrderId, patch: &OrderPatch) -> ClientResult<Order> {
        self.begin(Operation::UpdateOrder)?;
        let mut state = lock(&self.state);

        let customer = match patch.customer_id {
            Some(id) => Some(
                state
                    .customers
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| rejected(Operation::UpdateOrder, 404, "Cliente não encontrado"))?,
            ),
            None => None,
        };

        let order = state
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| rejected(Operation::UpdateOrder, 404, "Pedido não encontrado"))?;
        if let Some(customer) = customer {
            order.customer = customer;
        }
        if let Some(status) = patch.status {
            order.status = status;
        }
        if let Some(total) = patch.total {
            order.total = total;
        }
        Ok(order.clone())
    }

    async fn update_order_status(&self, order_id: OrderId, status: OrderStatus) -> ClientResult<()> {
        self.begin(Operation::UpdateOrderStatus)?;
        let mut state = lock(&self.state);
        let order = state
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| rejected(Operation::UpdateOrderStatus, 404, "Pedido não encontrado"))?;
        order.status = status;
        Ok(())
    }

    async fn delete_order(&self, order_id: OrderId) -> ClientResult<()> {
        self.begin(Operation::DeleteOrder)?;
        lock(&self.state)
            .orders
            .remove(&order_id)
            .map(|_| ())
            .ok_or_else(|| rejected(Operation::DeleteOrder, 404, "Pedido não encontrado"))
    }

    async fn list_sales(&self) -> ClientResult<Vec<Sale>> {
        self.begin(Operation::ListSales)?;
        Ok(lock(&self.state).sales.values().cloned().collect())
    }

    async fn create_sale(&self, sale: &NewSale) -> ClientResult<Sale> {
        self.begin(Operation::CreateSale)?;
        let mut state = lock(&self.state);

        if !state.orders.contains_key(&sale.order_id) {
            return Err(rejected(Operation::CreateSale, 404, "Pedido não encontrado"));
        }
        if state.sales.values().any(|s| s.order_id == sale.order_id) {
            return Err(rejected(Operation::CreateSale, 400, "Pedido já possui venda"));
        }

        let created = Sale {
            id: state.next_id(),
            order_id: sale.order_id,
            staff_id: sale.staff_id,
            amount: sale.amount,
            payment_method: Some(sale.payment_method),
            sold_at: Utc::now(),
        };
        state.sales.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_sale(&self, sale_id: SaleId, patch: &SalePatch) -> ClientResult<Sale> {
        self.begin(Operation::UpdateSale)?;
        let mut state = lock(&self.state);
        let sale = state
            .sales
            .get_mut(&sale_id)
            .ok_or_else(|| rejected(Operation::UpdateSale, 404, "Venda não encontrada"))?;
        if let Some(amount) = patch.amount {
            sale.amount = amount;
        }
        if let Some(method) = patch.payment_method {
            sale.payment_method = Some(method);
        }
        Ok(sale.clone())
    }

    async fn delete_sale(&self, sale_id: SaleId) -> ClientResult<()> {
        self.begin(Operation::DeleteSale)?;
        lock(&self.state)
            .sales
            .remove(&sale_id)
            .map(|_| ())
            .ok_or_else(|| rejected(Operation::DeleteSale, 404, "Venda não encontrada"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::{Money, OrderItem};

    #[tokio::test]
    async fn test_create_order_checks_and_consumes_stock() {
        let store = MemoryStore::new();
        store.add_customer(1, "Bar do Zé");
        store.add_product(Product::new(10, "Cola", Money::from_cents(299), 5));

        let mut request = NewOrder {
            customer_id: 1,
            status: OrderStatus::Pending,
            total: Money::from_cents(1794),
            items: vec![OrderItem {
                product_id: 10,
                product_name: "Cola".to_string(),
                quantity: 6,
                unit_price: Money::from_cents(299),
            }],
        };
        let err = store.create_order(&request).await.unwrap_err();
        assert!(err.to_string().contains("Estoque insuficiente"));

        request.items[0].quantity = 5;
        let order = store.create_order(&request).await.unwrap();
        assert_eq!(order.customer.name, "Bar do Zé");
        assert_eq!(store.product(10).unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_fail_next_applies_once() {
        let store = MemoryStore::new();
        store.fail_next(Operation::ListSales);

        assert!(store.list_sales().await.is_err());
        assert!(store.list_sales().await.is_ok());
        assert_eq!(store.count(Operation::ListSales), 2);
    }
}
