//! # Wire Format
//!
//! JSON shapes exchanged with the remote store, and their conversion to
//! domain types.
//!
//! ## Wire Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Field kind          Inbound                    Outbound                │
//! │  ──────────          ───────                    ────────                │
//! │  price/amount/total  "2.99" (or 2.99, tolerated) "2.99" (always string) │
//! │  quantity/stock      integer                    integer                 │
//! │  status              "Enviado" ...              "Enviado" ...           │
//! │  payment method      "PIX", null                "PIX"                   │
//! │  timestamps          RFC 3339 or naive ISO      (never sent)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names follow the store's Portuguese schema and stay in this module.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use stockroom_core::validation::{validate_stock, validate_unit_price};
use stockroom_core::{
    CoreError, CustomerRef, Money, NewOrder, NewSale, Order, OrderItem, OrderPatch, OrderStatus,
    PaymentMethod, Product, Sale, SalePatch, StaffIdentity,
};

// =============================================================================
// Field Codecs
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDecimal {
    Text(String),
    Number(serde_json::Number),
}

fn decimal<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match RawDecimal::deserialize(deserializer)? {
        RawDecimal::Text(text) => text,
        RawDecimal::Number(number) => number.to_string(),
    };
    Money::parse_decimal(&text).map_err(de::Error::custom)
}

fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", text)))
}

/// Accepts RFC 3339, a naive ISO date-time (read as UTC) or a bare date.
pub(crate) fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Serialize)]
pub struct LoginForm<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenInfo {
    pub id: i64,
    pub sub: String,
}

impl From<TokenInfo> for StaffIdentity {
    fn from(info: TokenInfo) -> Self {
        StaffIdentity {
            id: info.id,
            email: info.sub,
        }
    }
}

// =============================================================================
// Products & Customers
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiProduct {
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(deserialize_with = "decimal")]
    pub preco: Money,
    pub quantidade_estoque: i64,
    #[serde(default)]
    pub categoria: Option<String>,
}

/// Rejects negative prices and stock figures.
impl TryFrom<ApiProduct> for Product {
    type Error = CoreError;

    fn try_from(api: ApiProduct) -> Result<Self, Self::Error> {
        validate_unit_price(api.preco)?;
        validate_stock(api.quantidade_estoque)?;

        Ok(Product {
            id: api.id,
            name: api.nome,
            description: api.descricao,
            category: api.categoria,
            unit_price: api.preco,
            stock: api.quantidade_estoque,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiCustomer {
    pub id: i64,
    pub nome: String,
}

impl From<ApiCustomer> for CustomerRef {
    fn from(api: ApiCustomer) -> Self {
        CustomerRef {
            id: api.id,
            name: api.nome,
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiOrderItem {
    pub produto_id: i64,
    pub quantidade: i64,
    #[serde(deserialize_with = "decimal")]
    pub preco_unitario: Money,
    #[serde(default)]
    pub nome_produto: Option<String>,
}

impl From<ApiOrderItem> for OrderItem {
    fn from(api: ApiOrderItem) -> Self {
        OrderItem {
            product_id: api.produto_id,
            product_name: api
                .nome_produto
                .unwrap_or_else(|| format!("#{}", api.produto_id)),
            quantity: api.quantidade,
            unit_price: api.preco_unitario,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiOrder {
    pub id: i64,
    pub cliente_id: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(deserialize_with = "decimal")]
    pub total: Money,
    #[serde(deserialize_with = "timestamp")]
    pub data_pedido: DateTime<Utc>,
    #[serde(default)]
    pub cliente: Option<ApiCustomer>,
    #[serde(default)]
    pub itens: Vec<ApiOrderItem>,
}

impl TryFrom<ApiOrder> for Order {
    type Error = CoreError;

    fn try_from(api: ApiOrder) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_wire_or_pending(api.status.as_deref())?;
        let customer = match api.cliente {
            Some(cliente) => cliente.into(),
            None => CustomerRef {
                id: api.cliente_id,
                name: String::new(),
            },
        };

        Ok(Order {
            id: api.id,
            customer,
            items: api.itens.into_iter().map(OrderItem::from).collect(),
            total: api.total,
            status,
            ordered_at: api.data_pedido,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiOrderItemCreate {
    pub produto_id: i64,
    pub quantidade: i64,
    pub preco_unitario: String,
}

#[derive(Debug, Serialize)]
pub struct ApiOrderCreate {
    pub cliente_id: i64,
    pub status: &'static str,
    pub total: String,
    pub itens: Vec<ApiOrderItemCreate>,
}

impl From<&NewOrder> for ApiOrderCreate {
    fn from(order: &NewOrder) -> Self {
        ApiOrderCreate {
            cliente_id: order.customer_id,
            status: order.status.as_wire(),
            total: order.total.to_decimal_string(),
            itens: order
                .items
                .iter()
                .map(|item| ApiOrderItemCreate {
                    produto_id: item.product_id,
                    quantidade: item.quantity,
                    preco_unitario: item.unit_price.to_decimal_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiOrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cliente_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
}

impl From<&OrderPatch> for ApiOrderUpdate {
    fn from(patch: &OrderPatch) -> Self {
        ApiOrderUpdate {
            cliente_id: patch.customer_id,
            status: patch.status.map(|s| s.as_wire()),
            total: patch.total.map(|t| t.to_decimal_string()),
        }
    }
}

// =============================================================================
// Sales
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiSale {
    pub id: i64,
    pub pedido_id: i64,
    #[serde(default)]
    pub funcionario_id: Option<i64>,
    #[serde(deserialize_with = "timestamp")]
    pub data_venda: DateTime<Utc>,
    #[serde(deserialize_with = "decimal")]
    pub valor_total: Money,
    #[serde(default)]
    pub forma_pagamento: Option<String>,
}

impl TryFrom<ApiSale> for Sale {
    type Error = CoreError;

    fn try_from(api: ApiSale) -> Result<Self, Self::Error> {
        let payment_method = match api.forma_pagamento.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(method) => Some(PaymentMethod::from_wire(method)?),
        };

        Ok(Sale {
            id: api.id,
            order_id: api.pedido_id,
            staff_id: api.funcionario_id,
            amount: api.valor_total,
            payment_method,
            sold_at: api.data_venda,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiSaleCreate {
    pub pedido_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funcionario_id: Option<i64>,
    pub valor_total: String,
    pub forma_pagamento: &'static str,
}

impl From<&NewSale> for ApiSaleCreate {
    fn from(sale: &NewSale) -> Self {
        ApiSaleCreate {
            pedido_id: sale.order_id,
            funcionario_id: sale.staff_id,
            valor_total: sale.amount.to_decimal_string(),
            forma_pagamento: sale.payment_method.as_wire(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiSaleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor_total: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forma_pagamento: Option<&'static str>,
}

impl From<&SalePatch> for ApiSaleUpdate {
    fn from(patch: &SalePatch) -> Self {
        ApiSaleUpdate {
            valor_total: patch.amount.map(|a| a.to_decimal_string()),
            forma_pagamento: patch.payment_method.map(|m| m.as_wire()),
        }
    }
}
