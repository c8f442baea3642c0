//! # stockroom-core: Pure Order/Sale Lifecycle Logic
//!
//! This crate is the **heart** of the Stockroom admin console. It keeps an
//! order's line items, its fulfillment status and the existence of its sale
//! record mutually consistent, without touching the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Stockroom Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Console UI (external collaborator)              │   │
//! │  │    Order form ──► Sale form ──► Sales table ──► Status prompt   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockroom-client (I/O shell)                    │   │
//! │  │    CatalogLookup, OrderDesk, SaleRecorder, AuthSession          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  money   │ │  status  │ │ composer │ │  reconciliation  │  │   │
//! │  │   │  Money   │ │OrderStat.│ │ OrderCom.│ │  Prompt          │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  types   │ │   sale   │ │  search  │ │   validation     │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO TIMERS • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, Sale, ...)
//! - [`money`] - Money type with integer arithmetic and decimal-string codec
//! - [`status`] - Order status vocabulary and the wire mapping table
//! - [`composer`] - Order composer (line items, stock checks, totals)
//! - [`sale`] - Sale draft validation
//! - [`reconciliation`] - Corrective status prompt after a sale deletion
//! - [`search`] - Request sequencing for debounced lookups
//! - [`validation`] - Input validation helpers
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::composer::OrderComposer;
//! use stockroom_core::money::Money;
//! use stockroom_core::types::Product;
//!
//! let cola = Product::new(1, "Cola", Money::from_cents(299), 5);
//! let water = Product::new(2, "Water", Money::from_cents(149), 10);
//!
//! let mut composer = OrderComposer::new();
//! composer.load_catalog(&[cola, water]);
//! composer.add_item(1, 2).unwrap();
//! composer.add_item(2, 3).unwrap();
//!
//! // 2 × $2.99 + 3 × $1.49
//! assert_eq!(composer.compute_total().cents(), 1045);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod composer;
pub mod error;
pub mod money;
pub mod reconciliation;
pub mod sale;
pub mod search;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use composer::{ComposerMode, OrderComposer};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use reconciliation::{ReconciliationPrompt, StatusChange};
pub use sale::SaleDraft;
pub use search::{SearchKind, SearchSequencer, SearchTicket};
pub use status::{OrderStatus, PaymentMethod};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single order.
///
/// ## Business Reason
/// Keeps composed orders within what the order form can reasonably display.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity of a single product in one order.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest magnitude, in cents, accepted from a decimal string ($10 billion).
///
/// ## Business Reason
/// Keeps every line total and order total comfortably inside `i64`.
pub const MAX_MONEY_CENTS: i64 = 1_000_000_000_000;

/// Maximum length of a free-text lookup query.
pub const MAX_QUERY_LEN: usize = 100;
