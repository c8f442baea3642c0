//! # Search Sequencing
//!
//! Keeps a lookup channel showing the result of the most recently
//! SUBMITTED query, never an older one that happened to resolve later.
//!
//! ```text
//! submit "co"   → ticket 1 ──────────────────────────► resolves last  ✗ dropped
//! submit "cola" → ticket 2 ───────────► resolves first              ✓ applied
//! ```
//!
//! Arrival order says nothing; only the ticket counts.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The entity a lookup channel searches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    Product,
    Customer,
    /// Orders with status `Shipped`, the only ones a sale may reference.
    ShippableOrder,
}

impl SearchKind {
    /// Products list the catalog on an empty query. Customers and orders
    /// return nothing; browsing them is opt-in.
    pub const fn browses_on_empty(&self) -> bool {
        matches!(self, SearchKind::Product)
    }
}

/// Identity of one submitted query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchTicket(u64);

impl SearchTicket {
    pub const fn value(&self) -> u64 {
        self.0
    }
}

/// Issues tickets for one channel and tells whether a ticket is still the
/// latest.
#[derive(Debug, Clone, Default)]
pub struct SearchSequencer {
    latest: u64,
}

impl SearchSequencer {
    pub fn new() -> Self {
        SearchSequencer::default()
    }

    /// Issues the ticket for a newly submitted query. Every earlier ticket
    /// becomes stale.
    pub fn issue(&mut self) -> SearchTicket {
        self.latest += 1;
        SearchTicket(self.latest)
    }

    /// Returns true if no query was submitted after `ticket`.
    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.latest
    }

    /// The last ticket issued, if any.
    pub fn latest(&self) -> Option<SearchTicket> {
        (self.latest > 0).then_some(SearchTicket(self.latest))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_ticket_is_current() {
        let mut sequencer = SearchSequencer::new();
        assert!(sequencer.latest().is_none());

        let first = sequencer.issue();
        assert!(sequencer.is_current(first));

        let second = sequencer.issue();
        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
        assert!(second > first);
        assert_eq!(sequencer.latest(), Some(second));
    }

    #[test]
    fn test_late_arrival_of_older_query_is_stale() {
        let mut sequencer = SearchSequencer::new();
        let slow = sequencer.issue();
        let fast = sequencer.issue();

        // "fast" resolves first and is applied; "slow" arrives afterwards.
        assert!(sequencer.is_current(fast));
        assert!(!sequencer.is_current(slow));
    }

    #[test]
    fn test_empty_query_policy() {
        assert!(SearchKind::Product.browses_on_empty());
        assert!(!SearchKind::Customer.browses_on_empty());
        assert!(!SearchKind::ShippableOrder.browses_on_empty());
    }
}
