//! # Remote Store Seam
//!
//! The one trait every remote call goes through.
//!
//! ```text
//! OrderDesk / SaleRecorder / CatalogLookup / AuthSession
//!                      │
//!                      ▼
//!            dyn RemoteStore
//!              │          │
//!              ▼          ▼
//!         HttpStore   MemoryStore
//!         (reqwest)   (tests, demos)
//! ```
//!
//! Each method is exactly one remote call. Nothing behind this trait retries.

use async_trait::async_trait;
use stockroom_core::{
    CustomerRef, NewOrder, NewSale, Order, OrderId, OrderPatch, OrderStatus, Product, Sale, SaleId,
    SalePatch, StaffIdentity,
};

use crate::error::ClientResult;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Exchanges credentials for a bearer token.
    async fn login(&self, email: &str, password: &str) -> ClientResult<String>;

    /// Resolves the current token to the signed-in staff member.
    async fn fetch_identity(&self) -> ClientResult<StaffIdentity>;

    /// Products matching `query`; an empty query lists the catalog.
    async fn search_products(&self, query: &str, limit: usize) -> ClientResult<Vec<Product>>;

    async fn search_customers(&self, query: &str) -> ClientResult<Vec<CustomerRef>>;

    /// Orders matching `query`, optionally restricted to one status.
    async fn search_orders(
        &self,
        query: &str,
        status: Option<OrderStatus>,
        limit: usize,
    ) -> ClientResult<Vec<Order>>;

    async fn get_order(&self, order_id: OrderId) -> ClientResult<Order>;

    async fn list_orders(&self) -> ClientResult<Vec<Order>>;

    async fn create_order(&self, order: &NewOrder) -> ClientResult<Order>;

    async fn update_order(&self, order_id: OrderId, patch: &OrderPatch) -> ClientResult<Order>;

    /// Partial update carrying only the status.
    async fn update_order_status(&self, order_id: OrderId, status: OrderStatus) -> ClientResult<()>;

    async fn delete_order(&self, order_id: OrderId) -> ClientResult<()>;

    async fn list_sales(&self) -> ClientResult<Vec<Sale>>;

    async fn create_sale(&self, sale: &NewSale) -> ClientResult<Sale>;

    async fn update_sale(&self, sale_id: SaleId, patch: &SalePatch) -> ClientResult<Sale>;

    async fn delete_sale(&self, sale_id: SaleId) -> ClientResult<()>;
}
