//! HTTP implementation of [`RemoteStore`] for the store's JSON API.
//!
//! ## Endpoints
//! ```text
//! POST   /token                       form username/password → access_token
//! GET    /me/token-info               → { id, sub }
//! GET    /produtos/?search=&limit=
//! GET    /clientes/?search=
//! GET    /pedidos/?search=&status_filter=&limit=
//! GET    /pedidos/{id}     PUT /pedidos/{id}     DELETE /pedidos/{id}
//! POST   /pedidos/
//! GET    /vendas/          POST /vendas/
//! PUT    /vendas/{id}      DELETE /vendas/{id}
//! ```
//!
//! Every request carries `Authorization: Bearer <token>` when a token is
//! held. A 401 clears the session.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use stockroom_core::{
    CustomerRef, NewOrder, NewSale, Order, OrderId, OrderPatch, OrderStatus, Product, Sale, SaleId,
    SalePatch, StaffIdentity,
};
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiSettings;
use crate::error::{ClientError, ClientResult, Operation};
use crate::session::AuthSession;
use crate::store::RemoteStore;
use crate::wire::{
    ApiCustomer, ApiOrder, ApiOrderCreate, ApiOrderUpdate, ApiProduct, ApiSale, ApiSaleCreate,
    ApiSaleUpdate, LoginForm, TokenInfo, TokenResponse,
};

/// HTTP client for the remote store.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: Url,
    session: Arc<AuthSession>,
}

impl HttpStore {
    /// Creates a store client from the API settings.
    pub fn new(settings: &ApiSettings, session: Arc<AuthSession>) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("HTTP client: {}", e)))?;

        // A trailing slash makes relative joins append instead of replace.
        let mut base = settings.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    fn url(&self, operation: Operation, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::unreachable(operation, e))
    }

    /// Attaches the bearer token and sends.
    async fn send(&self, operation: Operation, request: RequestBuilder) -> ClientResult<Response> {
        let request = match self.session.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        debug!(operation = %operation, "Sending request");
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::unreachable(operation, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED && operation != Operation::Login {
            warn!(operation = %operation, "Store rejected the session token");
            self.session.clear().await;
            return Err(ClientError::Unauthorized { operation });
        }

        Err(ClientError::remote(operation, status.as_u16(), &body))
    }

    async fn json<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> ClientResult<T> {
        let response = self.send(operation, request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::InvalidResponse {
                operation,
                reason: e.to_string(),
            })
    }

    async fn empty(&self, operation: Operation, request: RequestBuilder) -> ClientResult<()> {
        self.send(operation, request).await.map(|_| ())
    }
}

fn invalid(operation: Operation, err: impl std::fmt::Display) -> ClientError {
    ClientError::InvalidResponse {
        operation,
        reason: err.to_string(),
    }
}

fn product_from(operation: Operation, api: ApiProduct) -> ClientResult<Product> {
    Product::try_from(api).map_err(|e| invalid(operation, e))
}

fn order_from(operation: Operation, api: ApiOrder) -> ClientResult<Order> {
    Order::try_from(api).map_err(|e| invalid(operation, e))
}

fn sale_from(operation: Operation, api: ApiSale) -> ClientResult<Sale> {
    Sale::try_from(api).map_err(|e| invalid(operation, e))
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn login(&self, email: &str, password: &str) -> ClientResult<String> {
        let op = Operation::Login;
        let request = self.client.post(self.url(op, "token")?).form(&LoginForm {
            username: email,
            password,
        });
        let token: TokenResponse = self.json(op, request).await?;
        Ok(token.access_token)
    }

    async fn fetch_identity(&self) -> ClientResult<StaffIdentity> {
        let op = Operation::FetchIdentity;
        let request = self.client.get(self.url(op, "me/token-info")?);
        let info: TokenInfo = self.json(op, request).await?;
        Ok(info.into())
    }

    async fn search_products(&self, query: &str, limit: usize) -> ClientResult<Vec<Product>> {
        let op = Operation::SearchProducts;
        let request = self
            .client
            .get(self.url(op, "produtos/")?)
            .query(&[("search", query.to_string()), ("limit", limit.to_string())]);
        let products: Vec<ApiProduct> = self.json(op, request).await?;
        products.into_iter().map(|p| product_from(op, p)).collect()
    }

    async fn search_customers(&self, query: &str) -> ClientResult<Vec<CustomerRef>> {
        let op = Operation::SearchCustomers;
        let request = self
            .client
            .get(self.url(op, "clientes/")?)
            .query(&[("search", query)]);
        let customers: Vec<ApiCustomer> = self.json(op, request).await?;
        Ok(customers.into_iter().map(CustomerRef::from).collect())
    }

    async fn search_orders(
        &self,
        query: &str,
        status: Option<OrderStatus>,
        limit: usize,
    ) -> ClientResult<Vec<Order>> {
        let op = Operation::SearchOrders;
        let mut params = vec![("search", query.to_string()), ("limit", limit.to_string())];
        if let Some(status) = status {
            params.push(("status_filter", status.as_wire().to_string()));
        }
        let request = self.client.get(self.url(op, "pedidos/")?).query(&params);
        let orders: Vec<ApiOrder> = self.json(op, request).await?;
        orders.into_iter().map(|o| order_from(op, o)).collect()
    }

    async fn get_order(&self, order_id: OrderId) -> ClientResult<Order> {
        let op = Operation::GetOrder;
        let request = self.client.get(self.url(op, &format!("pedidos/{}", order_id))?);
        let order: ApiOrder = self.json(op, request).await?;
        order_from(op, order)
    }

    async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        let op = Operation::ListOrders;
        let request = self.client.get(self.url(op, "pedidos/")?);
        let orders: Vec<ApiOrder> = self.json(op, request).await?;
        orders.into_iter().map(|o| order_from(op, o)).collect()
    }

    async fn create_order(&self, order: &NewOrder) -> ClientResult<Order> {
        let op = Operation::CreateOrder;
        let request = self
            .client
            .post(self.url(op, "pedidos/")?)
            .json(&ApiOrderCreate::from(order));
        let created: ApiOrder = self.json(op, request).await?;
        order_from(op, created)
    }

    async fn update_order(&self, order_id: OrderId, patch: &OrderPatch) -> ClientResult<Order> {
        let op = Operation::UpdateOrder;
        let request = self
            .client
            .put(self.url(op, &format!("pedidos/{}", order_id))?)
            .json(&ApiOrderUpdate::from(patch));
        let updated: ApiOrder = self.json(op, request).await?;
        order_from(op, updated)
    }

    async fn update_order_status(&self, order_id: OrderId, status: OrderStatus) -> ClientResult<()> {
        let op = Operation::UpdateOrderStatus;
        let request = self
            .client
            .put(self.url(op, &format!("pedidos/{}", order_id))?)
            .json(&ApiOrderUpdate::from(&OrderPatch::status(status)));
        self.empty(op, request).await
    }

    async fn delete_order(&self, order_id: OrderId) -> ClientResult<()> {
        let op = Operation::DeleteOrder;
        let request = self
            .client
            .delete(self.url(op, &format!("pedidos/{}", order_id))?);
        self.empty(op, request).await
    }

    async fn list_sales(&self) -> ClientResult<Vec<Sale>> {
        let op = Operation::ListSales;
        let request = self.client.get(self.url(op, "vendas/")?);
        let sales: Vec<ApiSale> = self.json(op, request).await?;
        sales.into_iter().map(|s| sale_from(op, s)).collect()
    }

    async fn create_sale(&self, sale: &NewSale) -> ClientResult<Sale> {
        let op = Operation::CreateSale;
        let request = self
            .client
            .post(self.url(op, "vendas/")?)
            .json(&ApiSaleCreate::from(sale));
        let created: ApiSale = self.json(op, request).await?;
        sale_from(op, created)
    }

    async fn update_sale(&self, sale_id: SaleId, patch: &SalePatch) -> ClientResult<Sale> {
        let op = Operation::UpdateSale;
        let request = self
            .client
            .put(self.url(op, &format!("vendas/{}", sale_id))?)
            .json(&ApiSaleUpdate::from(patch));
        let updated: ApiSale = self.json(op, request).await?;
        sale_from(op, updated)
    }

    async fn delete_sale(&self, sale_id: SaleId) -> ClientResult<()> {
        let op = Operation::DeleteSale;
        let request = self
            .client
            .delete(self.url(op, &format!("vendas/{}", sale_id))?);
        self.empty(op, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_at(base_url: &str) -> HttpStore {
        let settings = ApiSettings {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        };
        HttpStore::new(&settings, Arc::new(AuthSession::in_memory())).unwrap()
    }

    #[test]
    fn test_paths_join_under_base() {
        let store = store_at("https://api.example.com/v1");
        assert_eq!(
            store.url(Operation::GetOrder, "pedidos/7").unwrap().as_str(),
            "https://api.example.com/v1/pedidos/7"
        );

        let store = store_at("http://127.0.0.1:8000/");
        assert_eq!(
            store.url(Operation::ListSales, "vendas/").unwrap().as_str(),
            "http://127.0.0.1:8000/vendas/"
        );
    }

    #[test]
    fn test_negative_price_is_an_invalid_response() {
        let api: ApiProduct = serde_json::from_value(serde_json::json!({
            "id": 1,
            "nome": "Cola 2L",
            "preco": "-2.99",
            "quantidade_estoque": -4
        }))
        .unwrap();

        match product_from(Operation::SearchProducts, api) {
            Err(ClientError::InvalidResponse { operation, .. }) => {
                assert_eq!(operation, Operation::SearchProducts)
            }
            other => panic!("expected invalid response, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_base_url() {
        let settings = ApiSettings {
            base_url: "::not a url".to_string(),
            timeout_secs: 5,
        };
        assert!(HttpStore::new(&settings, Arc::new(AuthSession::in_memory())).is_err());
    }
}
