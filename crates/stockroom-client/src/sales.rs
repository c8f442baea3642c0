//! # Sale Recorder
//!
//! Records, edits and deletes sales, and keeps the order lifecycle in step.
//!
//! ## Lifecycle Coupling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create_sale(draft)                                                     │
//! │     │                                                                   │
//! │     ├── validate (no call on failure)                                   │
//! │     ├── POST /vendas/ ────────── failure ──► Err, zero status updates    │
//! │     └── set_status(order, Delivered)   exactly one attempt              │
//! │            │                                                            │
//! │            └── failure ──► SaleOutcome { sale, status_update: Err }     │
//! │                                                                         │
//! │  delete_sale(listing)                                                   │
//! │     ├── DELETE /vendas/{id}                                             │
//! │     └── prompt: Idle → AwaitingChoice(order, current, suggested)        │
//! │                          │                                              │
//! │          confirm(status) ┤ one set_status call, back to Idle            │
//! │          skip()          ┘ no call, back to Idle                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting a sale never changes the order's status by itself. The operator
//! decides through the reconciliation prompt.

use std::sync::{Arc, Mutex};

use futures_util::future::join_all;
use stockroom_core::sale::validate_patch;
use stockroom_core::{
    OrderStatus, ReconciliationPrompt, Sale, SaleDraft, SaleId, SaleListing, SalePatch,
    StatusChange,
};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult, Operation};
use crate::lock;
use crate::orders::OrderDesk;
use crate::session::AuthSession;
use crate::store::RemoteStore;

// =============================================================================
// Sale Outcome
// =============================================================================

/// Result of a successful sale creation. The status update is reported
/// separately because it can fail on its own.
#[derive(Debug)]
pub struct SaleOutcome {
    pub sale: Sale,
    pub status_update: ClientResult<()>,
}

impl SaleOutcome {
    /// True when the order was also moved to `Delivered`.
    pub fn is_complete(&self) -> bool {
        self.status_update.is_ok()
    }

    /// Collapses the outcome, turning a failed status update into
    /// `PartialSuccess`.
    pub fn into_result(self) -> ClientResult<Sale> {
        match self.status_update {
            Ok(()) => Ok(self.sale),
            Err(e) => Err(ClientError::PartialSuccess {
                completed: Operation::CreateSale,
                failed: Operation::UpdateOrderStatus,
                message: format!(
                    "sale {} was recorded but order {} is not marked delivered: {}",
                    self.sale.invoice_number(),
                    self.sale.order_id,
                    e
                ),
            }),
        }
    }
}

// =============================================================================
// Sale Recorder
// =============================================================================

pub struct SaleRecorder {
    store: Arc<dyn RemoteStore>,
    session: Arc<AuthSession>,
    desk: OrderDesk,
    prompt: Mutex<ReconciliationPrompt>,
}

impl SaleRecorder {
    pub fn new(store: Arc<dyn RemoteStore>, session: Arc<AuthSession>) -> Self {
        SaleRecorder {
            desk: OrderDesk::new(Arc::clone(&store)),
            store,
            session,
            prompt: Mutex::new(ReconciliationPrompt::Idle),
        }
    }

    /// Records a sale against a shipped order, then marks the order
    /// delivered.
    ///
    /// The draft's staff member defaults to the signed-in identity.
    ///
    /// ## Errors
    /// Validation failures and a failed create are returned as `Err` and
    /// issue no status update. A failed status update after a successful
    /// create is reported in [`SaleOutcome::status_update`].
    pub async fn create_sale(&self, draft: &SaleDraft) -> ClientResult<SaleOutcome> {
        let mut draft = draft.clone();
        if draft.staff_id().is_none() {
            draft.set_staff(self.session.staff_id().await);
        }
        let request = draft.validate()?;

        debug!(
            order_id = request.order_id,
            amount = %request.amount,
            payment_method = %request.payment_method,
            "Recording sale"
        );
        let sale = self.store.create_sale(&request).await?;
        info!(sale_id = sale.id, order_id = sale.order_id, "Sale recorded");

        let status_update = self
            .desk
            .set_status(sale.order_id, OrderStatus::Delivered)
            .await;
        if let Err(e) = &status_update {
            warn!(
                sale_id = sale.id,
                order_id = sale.order_id,
                error = %e,
                "Sale recorded but order status was not updated"
            );
        }

        Ok(SaleOutcome {
            sale,
            status_update,
        })
    }

    /// Changes a sale's amount or payment method.
    pub async fn update_sale(&self, sale_id: SaleId, patch: &SalePatch) -> ClientResult<Sale> {
        validate_patch(patch)?;

        debug!(sale_id, ?patch, "Updating sale");
        let sale = self.store.update_sale(sale_id, patch).await?;
        info!(sale_id, amount = %sale.amount, "Sale updated");
        Ok(sale)
    }

    /// Deletes a sale and opens the reconciliation prompt for its order.
    ///
    /// When the listing does not know the order's status, the order is
    /// assumed delivered.
    pub async fn delete_sale(&self, listing: &SaleListing) -> ClientResult<ReconciliationPrompt> {
        let sale = &listing.sale;
        self.store.delete_sale(sale.id).await?;

        let current = listing.order_status.unwrap_or(OrderStatus::Delivered);
        info!(
            sale_id = sale.id,
            order_id = sale.order_id,
            order_status = %current,
            "Sale deleted, awaiting order status choice"
        );

        let mut prompt = lock(&self.prompt);
        prompt.begin(sale.order_id, current);
        Ok(*prompt)
    }

    pub fn prompt(&self) -> ReconciliationPrompt {
        *lock(&self.prompt)
    }

    /// Applies the operator's status choice with a single status update.
    /// The prompt is idle afterwards whatever the call returns.
    pub async fn confirm_reconciliation(&self, chosen: OrderStatus) -> ClientResult<StatusChange> {
        let change = lock(&self.prompt).confirm(chosen)?;

        debug!(order_id = change.order_id, from = %change.from, to = %change.to, "Reconciling order");
        self.desk.set_status(change.order_id, change.to).await?;
        Ok(change)
    }

    /// Leaves the order as it is.
    pub fn skip_reconciliation(&self) {
        let mut prompt = lock(&self.prompt);
        if let ReconciliationPrompt::AwaitingChoice { order_id, .. } = *prompt {
            debug!(order_id, "Reconciliation skipped");
        }
        prompt.skip();
    }

    /// Lists sales joined with their orders. Orders are fetched
    /// concurrently; a row whose order cannot be fetched is kept without
    /// order details.
    pub async fn list_sales(&self) -> ClientResult<Vec<SaleListing>> {
        let sales = self.store.list_sales().await?;

        let orders = join_all(sales.iter().map(|s| self.store.get_order(s.order_id))).await;

        Ok(sales
            .into_iter()
            .zip(orders)
            .map(|(sale, order)| match order {
                Ok(order) => SaleListing::new(sale, Some(&order)),
                Err(e) => {
                    warn!(sale_id = sale.id, order_id = sale.order_id, error = %e, "Order details unavailable");
                    SaleListing::new(sale, None)
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use chrono::Utc;
    use stockroom_core::{CustomerRef, Money, Order, PaymentMethod};

    fn order(id: i64, status: OrderStatus) -> Order {
        Order {
            id,
            customer: CustomerRef {
                id: 1,
                name: "Bar do Zé".to_string(),
            },
            items: Vec::new(),
            total: Money::from_cents(1045),
            status,
            ordered_at: Utc::now(),
        }
    }

    fn draft(order: &Order) -> SaleDraft {
        let mut draft = SaleDraft::for_order(order);
        draft.set_payment_method(PaymentMethod::Pix);
        draft
    }

    fn setup() -> (Arc<MemoryStore>, SaleRecorder) {
        let store = Arc::new(MemoryStore::new());
        let recorder = SaleRecorder::new(store.clone(), Arc::new(AuthSession::in_memory()));
        (store, recorder)
    }

    #[tokio::test]
    async fn test_create_sale_marks_order_delivered() {
        let (store, recorder) = setup();
        let shipped = order(7, OrderStatus::Shipped);
        store.insert_order(shipped.clone());

        let outcome = recorder.create_sale(&draft(&shipped)).await.unwrap();

        assert!(outcome.is_complete());
        assert_eq!(store.count(Operation::UpdateOrderStatus), 1);
        assert_eq!(store.order(7).unwrap().status, OrderStatus::Delivered);
        assert_eq!(outcome.sale.amount, Money::from_cents(1045));
    }

    #[tokio::test]
    async fn test_create_sale_uses_session_staff() {
        let store = Arc::new(MemoryStore::new());
        store.add_staff(4, "ana@example.com", "secret");
        let session = Arc::new(AuthSession::in_memory());
        session
            .login(store.as_ref(), "ana@example.com", "secret")
            .await
            .unwrap();
        let recorder = SaleRecorder::new(store.clone(), session);

        let shipped = order(7, OrderStatus::Shipped);
        store.insert_order(shipped.clone());

        let outcome = recorder.create_sale(&draft(&shipped)).await.unwrap();
        assert_eq!(outcome.sale.staff_id, Some(4));
    }

    #[tokio::test]
    async fn test_unshipped_order_is_rejected_locally() {
        let (store, recorder) = setup();
        let pending = order(7, OrderStatus::Pending);
        store.insert_order(pending.clone());

        let err = recorder.create_sale(&draft(&pending)).await.unwrap_err();

        assert!(err.is_validation());
        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn test_status_failure_is_partial_success() {
        let (store, recorder) = setup();
        let shipped = order(7, OrderStatus::Shipped);
        store.insert_order(shipped.clone());
        store.fail_next(Operation::UpdateOrderStatus);

        let outcome = recorder.create_sale(&draft(&shipped)).await.unwrap();
        assert!(!outcome.is_complete());

        let sale_id = outcome.sale.id;
        let err = outcome.into_result().unwrap_err();
        assert!(err.is_partial_success());
        assert!(store.sale(sale_id).is_some());
        assert_eq!(store.order(7).unwrap().status, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn test_confirm_without_prompt() {
        let (store, recorder) = setup();

        let err = recorder
            .confirm_reconciliation(OrderStatus::Shipped)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Core(_)));
        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn test_update_sale_rejects_non_positive_amount() {
        let (store, recorder) = setup();
        let patch = SalePatch {
            amount: Some(Money::zero()),
            payment_method: None,
        };

        let err = recorder.update_sale(1, &patch).await.unwrap_err();

        assert!(err.is_validation());
        assert!(store.operations().is_empty());
    }
}
