//! # stockroom-client: Remote Store Orchestration for Stockroom
//!
//! Everything in the console that talks to the remote store or keeps state
//! between calls. Domain rules live in `stockroom-core`; this crate calls
//! them before and after each remote operation.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              Console                                    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ CatalogLookup  │  │   OrderDesk    │  │     SaleRecorder       │    │
//! │  │                │  │                │  │                        │    │
//! │  │ Debounced      │  │ set_status     │  │ create → Delivered     │    │
//! │  │ product/       │  │ submit         │  │ delete → prompt        │    │
//! │  │ customer/order │  │ delete policy  │  │ list with order join   │    │
//! │  │ channels       │  │                │  │                        │    │
//! │  └───────┬────────┘  └───────┬────────┘  └───────────┬────────────┘    │
//! │          │                   │                       │                  │
//! │          └───────────────────┼───────────────────────┘                  │
//! │                              ▼                                          │
//! │                     dyn RemoteStore ◄──── AuthSession (bearer token)    │
//! │                       │          │                                      │
//! │                  HttpStore   MemoryStore                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`catalog`] - Debounced, sequenced lookups
//! - [`config`] - Console configuration (API, search, session)
//! - [`console`] - Facade wiring everything together
//! - [`error`] - Client error types and operation tags
//! - [`http`] - reqwest implementation of the store
//! - [`memory`] - In-memory store for tests and the demo
//! - [`orders`] - Order status, submission and deletion
//! - [`sales`] - Sale recording and reconciliation
//! - [`session`] - Bearer token and staff identity
//! - [`store`] - The `RemoteStore` trait
//! - [`wire`] - JSON shapes of the remote API
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_client::{Console, ConsoleConfig};
//!
//! let console = Console::connect(ConsoleConfig::load(None)?)?;
//! console.login("ana@example.com", "secret").await?;
//!
//! console.lookup().search_shippable_orders("bar").await;
//! let order = console.lookup().shippable_orders().results()[0].clone();
//!
//! let mut draft = SaleDraft::for_order(&order);
//! draft.set_payment_method(PaymentMethod::Pix);
//! let sale = console.sales().create_sale(&draft).await?.into_result()?;
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod config;
pub mod console;
pub mod error;
pub mod http;
pub mod memory;
pub mod orders;
pub mod sales;
pub mod session;
pub mod store;
pub mod wire;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::{CatalogLookup, LookupOutcome, LookupState, SearchChannel};
pub use config::{ApiSettings, ConsoleConfig, SearchSettings, SessionSettings};
pub use console::Console;
pub use error::{ClientError, ClientResult, Operation};
pub use http::HttpStore;
pub use memory::MemoryStore;
pub use orders::OrderDesk;
pub use sales::{SaleOutcome, SaleRecorder};
pub use session::AuthSession;
pub use store::RemoteStore;

/// Locks a std mutex, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
