//! # Reconciliation Prompt
//!
//! The corrective status choice offered after a sale is deleted.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            sale deleted                                                 │
//! │   ┌──────┐ ───────────► ┌────────────────────────────────────────┐      │
//! │   │ Idle │              │ AwaitingChoice                         │      │
//! │   └──────┘ ◄─────────── │   order_id, current, suggested         │      │
//! │      ▲       skip()     └──────────────────┬─────────────────────┘      │
//! │      │                                     │ confirm(chosen)            │
//! │      └─────────────────────────────────────┘ → one StatusChange         │
//! │                                                                         │
//! │  suggested = Shipped  if current == Delivered                           │
//! │            = current  otherwise                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - The prompt never talks to the remote store. `confirm` hands back the
//!   single status change the caller must issue.
//! - Both exits return to `Idle`. There is no re-entry without a new deletion.
//! - A new deletion while awaiting replaces the earlier occurrence.

use crate::error::CoreError;
use crate::status::OrderStatus;
use crate::types::OrderId;

/// A status update the caller must send for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub order_id: OrderId,
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// The prompt's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconciliationPrompt {
    #[default]
    Idle,
    AwaitingChoice {
        order_id: OrderId,
        current_status: OrderStatus,
        suggested_status: OrderStatus,
    },
}

impl ReconciliationPrompt {
    /// Status to pre-select for an order whose sale was just deleted.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::reconciliation::ReconciliationPrompt;
    /// use stockroom_core::status::OrderStatus;
    ///
    /// assert_eq!(
    ///     ReconciliationPrompt::suggest(OrderStatus::Delivered),
    ///     OrderStatus::Shipped
    /// );
    /// assert_eq!(
    ///     ReconciliationPrompt::suggest(OrderStatus::Cancelled),
    ///     OrderStatus::Cancelled
    /// );
    /// ```
    pub const fn suggest(current: OrderStatus) -> OrderStatus {
        match current {
            OrderStatus::Delivered => OrderStatus::Shipped,
            other => other,
        }
    }

    /// Enters `AwaitingChoice` for the order of a deleted sale.
    pub fn begin(&mut self, order_id: OrderId, current_status: OrderStatus) {
        *self = ReconciliationPrompt::AwaitingChoice {
            order_id,
            current_status,
            suggested_status: Self::suggest(current_status),
        };
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self, ReconciliationPrompt::AwaitingChoice { .. })
    }

    /// Accepts the operator's choice and returns to `Idle`.
    ///
    /// ## Errors
    /// `NoPendingReconciliation` if the prompt is idle. State is unchanged.
    pub fn confirm(&mut self, chosen: OrderStatus) -> Result<StatusChange, CoreError> {
        match *self {
            ReconciliationPrompt::Idle => Err(CoreError::NoPendingReconciliation),
            ReconciliationPrompt::AwaitingChoice {
                order_id,
                current_status,
                ..
            } => {
                *self = ReconciliationPrompt::Idle;
                Ok(StatusChange {
                    order_id,
                    from: current_status,
                    to: chosen,
                })
            }
        }
    }

    /// Dismisses the prompt without any status change.
    pub fn skip(&mut self) {
        *self = ReconciliationPrompt::Idle;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivered_suggests_shipped() {
        let mut prompt = ReconciliationPrompt::default();
        prompt.begin(9, OrderStatus::Delivered);

        assert_eq!(
            prompt,
            ReconciliationPrompt::AwaitingChoice {
                order_id: 9,
                current_status: OrderStatus::Delivered,
                suggested_status: OrderStatus::Shipped,
            }
        );
    }

    #[test]
    fn test_other_statuses_suggest_themselves() {
        for status in OrderStatus::ALL {
            if status == OrderStatus::Delivered {
                continue;
            }
            assert_eq!(ReconciliationPrompt::suggest(status), status);
        }
    }

    #[test]
    fn test_confirm_returns_change_and_goes_idle() {
        let mut prompt = ReconciliationPrompt::default();
        prompt.begin(9, OrderStatus::Delivered);

        let change = prompt.confirm(OrderStatus::Processing).unwrap();
        assert_eq!(
            change,
            StatusChange {
                order_id: 9,
                from: OrderStatus::Delivered,
                to: OrderStatus::Processing,
            }
        );
        assert_eq!(prompt, ReconciliationPrompt::Idle);

        // No re-entry without a new deletion.
        assert_eq!(
            prompt.confirm(OrderStatus::Shipped),
            Err(CoreError::NoPendingReconciliation)
        );
    }

    #[test]
    fn test_skip_goes_idle() {
        let mut prompt = ReconciliationPrompt::default();
        prompt.begin(3, OrderStatus::Delivered);
        prompt.skip();
        assert!(!prompt.is_awaiting());
    }

    #[test]
    fn test_new_deletion_replaces_pending_prompt() {
        let mut prompt = ReconciliationPrompt::default();
        prompt.begin(1, OrderStatus::Delivered);
        prompt.begin(2, OrderStatus::Shipped);

        let change = prompt.confirm(OrderStatus::Shipped).unwrap();
        assert_eq!(change.order_id, 2);
    }
}
