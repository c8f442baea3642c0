//! # Catalog Lookup
//!
//! Debounced, sequenced searches for products, customers and shippable
//! orders. Each kind is an independent channel with its own timer.
//!
//! ## Channel Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  search("co")    arm: ticket 1, token A ── sleep(debounce) ──┐          │
//! │                                                              │          │
//! │  search("cola")  arm: cancel A, ticket 2, token B            │          │
//! │                      │                    (A cancelled) ◄────┘          │
//! │                      ▼                    → Superseded, no call         │
//! │                  sleep(debounce) ── fetch ── apply(ticket 2)            │
//! │                                                 │                       │
//! │                                                 ▼                       │
//! │                                  ticket still latest? → Ready           │
//! │                                  newer ticket issued? → Superseded      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - The visible state always belongs to the most recently submitted query,
//!   whatever order responses arrive in.
//! - Empty product queries list the catalog; empty customer and order
//!   queries resolve to nothing without a call.
//! - Failures land in the channel's `Failed` state. Nothing is thrown past
//!   the lookup.

use std::future::Future;
use std::sync::{Arc, Mutex};

use stockroom_core::validation::validate_search_query;
use stockroom_core::{CustomerRef, Order, OrderStatus, Product, SearchKind, SearchSequencer, SearchTicket};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::SearchSettings;
use crate::error::ClientResult;
use crate::lock;
use crate::store::RemoteStore;

// =============================================================================
// Channel State
// =============================================================================

/// What a channel currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupState<T> {
    Idle,
    Loading { query: String },
    Ready { query: String, results: Vec<T> },
    Failed { query: String, message: String },
}

impl<T> LookupState<T> {
    /// Results if the channel is `Ready`, otherwise empty.
    pub fn results(&self) -> &[T] {
        match self {
            LookupState::Ready { results, .. } => results,
            _ => &[],
        }
    }
}

/// How one `search_*` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The results became the channel's state.
    Applied,
    /// The failure became the channel's state.
    Failed,
    /// A newer query took over; nothing was applied.
    Superseded,
}

struct PendingQuery {
    query: String,
    cancel: CancellationToken,
}

/// One search channel: sequencer, pending timer and visible state.
pub struct SearchChannel<T> {
    kind: SearchKind,
    sequencer: SearchSequencer,
    pending: Option<PendingQuery>,
    state: LookupState<T>,
}

impl<T: Clone> SearchChannel<T> {
    pub fn new(kind: SearchKind) -> Self {
        SearchChannel {
            kind,
            sequencer: SearchSequencer::new(),
            pending: None,
            state: LookupState::Idle,
        }
    }

    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    pub fn state(&self) -> &LookupState<T> {
        &self.state
    }

    /// Cancels any running timer and arms a new one for `query`.
    fn arm(&mut self, query: &str) -> (SearchTicket, CancellationToken) {
        if let Some(previous) = self.pending.take() {
            debug!(kind = ?self.kind, query = %previous.query, "Cancelling pending lookup");
            previous.cancel.cancel();
        }

        let ticket = self.sequencer.issue();
        let cancel = CancellationToken::new();
        self.pending = Some(PendingQuery {
            query: query.to_string(),
            cancel: cancel.clone(),
        });
        self.state = LookupState::Loading {
            query: query.to_string(),
        };
        (ticket, cancel)
    }

    /// The timer for `ticket` fired; the query is now in flight.
    fn fire(&mut self, ticket: SearchTicket) -> bool {
        if !self.sequencer.is_current(ticket) {
            return false;
        }
        self.pending = None;
        true
    }

    /// Applies a result if `ticket` is still the latest.
    fn apply(&mut self, ticket: SearchTicket, query: &str, result: Result<Vec<T>, String>) -> LookupOutcome {
        if !self.sequencer.is_current(ticket) {
            return LookupOutcome::Superseded;
        }
        self.pending = None;

        match result {
            Ok(results) => {
                self.state = LookupState::Ready {
                    query: query.to_string(),
                    results,
                };
                LookupOutcome::Applied
            }
            Err(message) => {
                self.state = LookupState::Failed {
                    query: query.to_string(),
                    message,
                };
                LookupOutcome::Failed
            }
        }
    }
}

// =============================================================================
// Catalog Lookup
// =============================================================================

/// The three lookup channels of the console.
pub struct CatalogLookup {
    store: Arc<dyn RemoteStore>,
    settings: SearchSettings,
    products: Mutex<SearchChannel<Product>>,
    customers: Mutex<SearchChannel<CustomerRef>>,
    orders: Mutex<SearchChannel<Order>>,
}

impl CatalogLookup {
    pub fn new(store: Arc<dyn RemoteStore>, settings: SearchSettings) -> Self {
        CatalogLookup {
            store,
            settings,
            products: Mutex::new(SearchChannel::new(SearchKind::Product)),
            customers: Mutex::new(SearchChannel::new(SearchKind::Customer)),
            orders: Mutex::new(SearchChannel::new(SearchKind::ShippableOrder)),
        }
    }

    /// Searches products. An empty query lists the catalog up to
    /// `product_limit`.
    pub async fn search_products(&self, query: &str) -> LookupOutcome {
        let store = Arc::clone(&self.store);
        let limit = self.settings.product_limit;
        self.run(&self.products, query, move |q| async move {
            store.search_products(&q, limit).await
        })
        .await
    }

    pub async fn search_customers(&self, query: &str) -> LookupOutcome {
        let store = Arc::clone(&self.store);
        self.run(&self.customers, query, move |q| async move {
            store.search_customers(&q).await
        })
        .await
    }

    /// Searches orders a sale can be recorded against (status `Shipped`).
    pub async fn search_shippable_orders(&self, query: &str) -> LookupOutcome {
        let store = Arc::clone(&self.store);
        let limit = self.settings.order_limit;
        self.run(&self.orders, query, move |q| async move {
            store
                .search_orders(&q, Some(OrderStatus::Shipped), limit)
                .await
        })
        .await
    }

    pub fn products(&self) -> LookupState<Product> {
        lock(&self.products).state().clone()
    }

    pub fn customers(&self) -> LookupState<CustomerRef> {
        lock(&self.customers).state().clone()
    }

    pub fn shippable_orders(&self) -> LookupState<Order> {
        lock(&self.orders).state().clone()
    }

    async fn run<T, F, Fut>(&self, channel: &Mutex<SearchChannel<T>>, raw_query: &str, fetch: F) -> LookupOutcome
    where
        T: Clone,
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = ClientResult<Vec<T>>>,
    {
        let (kind, ticket, cancel) = {
            let mut channel = lock(channel);
            let (ticket, cancel) = channel.arm(raw_query.trim());
            (channel.kind(), ticket, cancel)
        };

        let query = match validate_search_query(raw_query) {
            Ok(query) => query,
            Err(e) => {
                debug!(?kind, error = %e, "Rejected lookup query");
                return lock(channel).apply(ticket, raw_query.trim(), Err(e.to_string()));
            }
        };

        if query.is_empty() && !kind.browses_on_empty() {
            return lock(channel).apply(ticket, &query, Ok(Vec::new()));
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(?kind, query = %query, "Lookup superseded during debounce");
                return LookupOutcome::Superseded;
            }
            _ = tokio::time::sleep(self.settings.debounce()) => {}
        }

        if !lock(channel).fire(ticket) {
            return LookupOutcome::Superseded;
        }

        debug!(?kind, query = %query, "Running lookup");
        let result = fetch(query.clone()).await.map_err(|e| {
            warn!(?kind, query = %query, error = %e, "Lookup failed");
            e.to_string()
        });

        let outcome = lock(channel).apply(ticket, &query, result);
        if outcome == LookupOutcome::Superseded {
            debug!(?kind, query = %query, "Discarding stale lookup result");
        }
        outcome
    }
}
