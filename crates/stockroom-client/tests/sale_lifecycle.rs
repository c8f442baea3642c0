//! Order → sale → reconciliation lifecycle against the in-memory store.

use std::sync::Arc;

use stockroom_client::{AuthSession, ClientError, Console, ConsoleConfig, MemoryStore, Operation};
use stockroom_core::{
    CustomerRef, Money, Order, OrderComposer, OrderStatus, PaymentMethod, Product,
    ReconciliationPrompt, SaleDraft,
};

// =============================================================================
// Fixtures
// =============================================================================

const COLA: i64 = 20;
const WATER: i64 = 21;

fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.add_staff(1, "ana@example.com", "secret");
    store.add_customer(10, "Bar do Zé");
    store.add_product(Product::new(COLA, "Cola", Money::from_cents(299), 5));
    store.add_product(Product::new(WATER, "Water", Money::from_cents(149), 24));
    store
}

async fn console_over(store: &Arc<MemoryStore>) -> Console {
    let console = Console::with_store(
        ConsoleConfig::default(),
        Arc::new(AuthSession::in_memory()),
        store.clone(),
    );
    console.login("ana@example.com", "secret").await.unwrap();
    console
}

/// Creates cola x2 + water x3 for Bar do Zé and ships it.
async fn shipped_order(console: &Console, store: &MemoryStore) -> Order {
    let mut composer = OrderComposer::new();
    composer.load_catalog(&[store.product(COLA).unwrap(), store.product(WATER).unwrap()]);
    composer.set_customer(CustomerRef {
        id: 10,
        name: "Bar do Zé".to_string(),
    });
    composer.add_item(COLA, 2).unwrap();
    composer.add_item(WATER, 3).unwrap();

    let order = console.orders().submit(&composer).await.unwrap();
    console
        .orders()
        .set_status(order.id, OrderStatus::Shipped)
        .await
        .unwrap();
    store.order(order.id).unwrap()
}

fn pix_draft(order: &Order) -> SaleDraft {
    let mut draft = SaleDraft::for_order(order);
    draft.set_payment_method(PaymentMethod::Pix);
    draft
}

// =============================================================================
// Sale Creation
// =============================================================================

#[tokio::test]
async fn test_sale_delivers_order_with_one_status_update() {
    let store = seeded_store();
    let console = console_over(&store).await;
    let order = shipped_order(&console, &store).await;
    assert_eq!(order.total, Money::from_cents(1045));
    store.clear_operations();

    let sale = console
        .sales()
        .create_sale(&pix_draft(&order))
        .await
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(
        store.operations(),
        vec![Operation::CreateSale, Operation::UpdateOrderStatus]
    );
    assert_eq!(sale.staff_id, Some(1));
    assert_eq!(sale.amount, Money::from_cents(1045));
    assert_eq!(store.order(order.id).unwrap().status, OrderStatus::Delivered);
}

#[tokio::test]
async fn test_failed_sale_issues_no_status_update() {
    let store = seeded_store();
    let console = console_over(&store).await;
    let order = shipped_order(&console, &store).await;
    store.clear_operations();
    store.fail_next(Operation::CreateSale);

    let err = console
        .sales()
        .create_sale(&pix_draft(&order))
        .await
        .unwrap_err();

    assert_eq!(err.operation(), Some(Operation::CreateSale));
    assert_eq!(store.count(Operation::UpdateOrderStatus), 0);
    assert_eq!(store.order(order.id).unwrap().status, OrderStatus::Shipped);
}

#[tokio::test]
async fn test_failed_status_update_keeps_sale() {
    let store = seeded_store();
    let console = console_over(&store).await;
    let order = shipped_order(&console, &store).await;
    store.clear_operations();
    store.fail_next(Operation::UpdateOrderStatus);

    let outcome = console
        .sales()
        .create_sale(&pix_draft(&order))
        .await
        .unwrap();
    let sale_id = outcome.sale.id;

    match outcome.into_result() {
        Err(ClientError::PartialSuccess {
            completed, failed, ..
        }) => {
            assert_eq!(completed, Operation::CreateSale);
            assert_eq!(failed, Operation::UpdateOrderStatus);
        }
        other => panic!("expected partial success, got {:?}", other),
    }
    assert_eq!(store.count(Operation::UpdateOrderStatus), 1);
    assert!(store.sale(sale_id).is_some());
    assert_eq!(store.order(order.id).unwrap().status, OrderStatus::Shipped);
}

// =============================================================================
// Sale Deletion & Reconciliation
// =============================================================================

#[tokio::test]
async fn test_delete_then_skip_leaves_order_delivered() {
    let store = seeded_store();
    let console = console_over(&store).await;
    let order = shipped_order(&console, &store).await;
    console
        .sales()
        .create_sale(&pix_draft(&order))
        .await
        .unwrap();

    let listings = console.sales().list_sales().await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].order_status, Some(OrderStatus::Delivered));
    assert_eq!(listings[0].items_summary.as_deref(), Some("Cola (x2), Water (x3)"));

    let prompt = console.sales().delete_sale(&listings[0]).await.unwrap();
    assert_eq!(
        prompt,
        ReconciliationPrompt::AwaitingChoice {
            order_id: order.id,
            current_status: OrderStatus::Delivered,
            suggested_status: OrderStatus::Shipped,
        }
    );

    store.clear_operations();
    console.sales().skip_reconciliation();

    assert!(store.operations().is_empty());
    assert_eq!(console.sales().prompt(), ReconciliationPrompt::Idle);
    assert_eq!(store.order(order.id).unwrap().status, OrderStatus::Delivered);
}

#[tokio::test]
async fn test_delete_then_confirm_sends_chosen_status() {
    let store = seeded_store();
    let console = console_over(&store).await;
    let order = shipped_order(&console, &store).await;
    console
        .sales()
        .create_sale(&pix_draft(&order))
        .await
        .unwrap();
    let listings = console.sales().list_sales().await.unwrap();
    console.sales().delete_sale(&listings[0]).await.unwrap();
    store.clear_operations();

    let change = console
        .sales()
        .confirm_reconciliation(OrderStatus::Shipped)
        .await
        .unwrap();

    assert_eq!(change.from, OrderStatus::Delivered);
    assert_eq!(change.to, OrderStatus::Shipped);
    assert_eq!(store.operations(), vec![Operation::UpdateOrderStatus]);
    assert_eq!(store.order(order.id).unwrap().status, OrderStatus::Shipped);

    // The order can be sold again.
    let again = store.order(order.id).unwrap();
    assert!(console
        .sales()
        .create_sale(&pix_draft(&again))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_confirm_returns_to_idle_when_update_fails() {
    let store = seeded_store();
    let console = console_over(&store).await;
    let order = shipped_order(&console, &store).await;
    console
        .sales()
        .create_sale(&pix_draft(&order))
        .await
        .unwrap();
    let listings = console.sales().list_sales().await.unwrap();
    console.sales().delete_sale(&listings[0]).await.unwrap();
    store.clear_operations();
    store.fail_next(Operation::UpdateOrderStatus);

    let result = console
        .sales()
        .confirm_reconciliation(OrderStatus::Cancelled)
        .await;

    assert!(result.is_err());
    assert_eq!(store.count(Operation::UpdateOrderStatus), 1);
    assert_eq!(console.sales().prompt(), ReconciliationPrompt::Idle);
}

#[tokio::test]
async fn test_failed_delete_leaves_prompt_idle() {
    let store = seeded_store();
    let console = console_over(&store).await;
    let order = shipped_order(&console, &store).await;
    let sale = console
        .sales()
        .create_sale(&pix_draft(&order))
        .await
        .unwrap()
        .sale;
    let listings = console.sales().list_sales().await.unwrap();
    store.clear_operations();
    store.fail_next(Operation::DeleteSale);

    let err = console.sales().delete_sale(&listings[0]).await.unwrap_err();

    assert_eq!(err.operation(), Some(Operation::DeleteSale));
    assert_eq!(console.sales().prompt(), ReconciliationPrompt::Idle);
    assert_eq!(store.count(Operation::UpdateOrderStatus), 0);
    assert!(store.sale(sale.id).is_some());
    assert_eq!(store.order(order.id).unwrap().status, OrderStatus::Delivered);
}

#[tokio::test]
async fn test_unreachable_order_degrades_listing_and_prompt_assumes_delivered() {
    let store = seeded_store();
    let console = console_over(&store).await;
    let order = shipped_order(&console, &store).await;
    console
        .sales()
        .create_sale(&pix_draft(&order))
        .await
        .unwrap();
    store.fail_next(Operation::GetOrder);

    let listings = console.sales().list_sales().await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].order_status, None);
    assert_eq!(listings[0].customer_name, None);

    let prompt = console.sales().delete_sale(&listings[0]).await.unwrap();
    assert!(matches!(
        prompt,
        ReconciliationPrompt::AwaitingChoice {
            suggested_status: OrderStatus::Shipped,
            ..
        }
    ));
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_order_with_sale_cannot_be_deleted() {
    let store = seeded_store();
    let console = console_over(&store).await;
    let order = shipped_order(&console, &store).await;
    console
        .sales()
        .create_sale(&pix_draft(&order))
        .await
        .unwrap();

    let err = console.orders().delete_order(order.id).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(store.count(Operation::DeleteOrder), 0);

    let listings = console.sales().list_sales().await.unwrap();
    console.sales().delete_sale(&listings[0]).await.unwrap();
    console.sales().skip_reconciliation();

    console.orders().delete_order(order.id).await.unwrap();
    assert!(store.order(order.id).is_none());
}

#[tokio::test]
async fn test_stock_limit_is_checked_before_submit() {
    let store = seeded_store();
    let console = console_over(&store).await;

    let mut composer = OrderComposer::new();
    composer.load_catalog(&[store.product(COLA).unwrap()]);
    composer.add_item(COLA, 3).unwrap();
    assert!(composer.add_item(COLA, 3).is_err());
    assert_eq!(composer.items().len(), 1);
    assert_eq!(composer.items()[0].quantity, 3);

    // No customer yet: nothing reaches the store.
    store.clear_operations();
    assert!(console.orders().submit(&composer).await.is_err());
    assert!(store.operations().is_empty());
}
