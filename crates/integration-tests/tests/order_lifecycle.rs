//! Order lifecycle behaviour over an in-memory store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::HashSet;

use chrono::Duration;
use rust_decimal::Decimal;

use linen_loft_admin::models::Order;
use linen_loft_admin::orders::{
    BulkAction, BulkActionRequest, OrderError, OrderFilter, Page, PaymentError, PaymentProvider,
    StatusUpdate, StubPaymentProvider,
};
use linen_loft_core::{OrderId, OrderStatus, PaymentStatus};
use linen_loft_integration_tests::{order, order_lifecycle, reference_time};

/// Declines refunds for the listed orders.
struct FlakyProcessor {
    declined: HashSet<OrderId>,
}

impl PaymentProvider for FlakyProcessor {
    async fn refund(&self, order: &Order) -> Result<(), PaymentError> {
        if self.declined.contains(&order.id) {
            Err(PaymentError::Unavailable("processor timeout".to_string()))
        } else {
            Ok(())
        }
    }
}

fn ids(raw: &[i32]) -> Vec<OrderId> {
    raw.iter().copied().map(OrderId::new).collect()
}

// =============================================================================
// Single order updates
// =============================================================================

#[tokio::test]
async fn test_pending_to_delivered_rejected_and_unchanged() {
    let orders = order_lifecycle(
        [order(1, OrderStatus::Pending, PaymentStatus::Paid)],
        StubPaymentProvider,
    );
    let before = orders.get(OrderId::new(1)).await.unwrap();

    let err = orders
        .update_status(StatusUpdate::to_status(
            OrderId::new(1),
            OrderStatus::Delivered,
        ))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Cannot transition from PENDING to DELIVERED");
    assert_eq!(orders.get(OrderId::new(1)).await.unwrap(), before);
}

#[tokio::test]
async fn test_full_happy_path() {
    let orders = order_lifecycle(
        [order(1, OrderStatus::Pending, PaymentStatus::Paid)],
        StubPaymentProvider,
    );

    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        let updated = orders
            .update_status(StatusUpdate::to_status(OrderId::new(1), status))
            .await
            .unwrap();
        assert_eq!(updated.status, status);
    }
}

#[tokio::test]
async fn test_shipping_estimate_set_once() {
    let orders = order_lifecycle(
        [order(1, OrderStatus::Processing, PaymentStatus::Paid)],
        StubPaymentProvider,
    );
    let shipped_at = reference_time() + Duration::days(1);

    let shipped = orders
        .update_status_at(
            StatusUpdate {
                tracking_number: Some("1Z-LL-778".to_string()),
                ..StatusUpdate::to_status(OrderId::new(1), OrderStatus::Shipped)
            },
            shipped_at,
        )
        .await
        .unwrap();
    assert_eq!(
        shipped.estimated_delivery,
        Some(shipped_at + Duration::days(7))
    );
    assert_eq!(shipped.tracking_number.as_deref(), Some("1Z-LL-778"));

    let repeated = orders
        .update_status_at(
            StatusUpdate::to_status(OrderId::new(1), OrderStatus::Shipped),
            shipped_at + Duration::days(3),
        )
        .await
        .unwrap();
    assert_eq!(
        repeated.estimated_delivery,
        Some(shipped_at + Duration::days(7))
    );
}

// =============================================================================
// Bulk actions
// =============================================================================

#[tokio::test]
async fn test_bulk_cancel_with_delivered_order_modifies_nothing() {
    let orders = order_lifecycle(
        [
            order(1, OrderStatus::Pending, PaymentStatus::Pending),
            order(2, OrderStatus::Confirmed, PaymentStatus::Paid),
            order(3, OrderStatus::Delivered, PaymentStatus::Paid),
        ],
        StubPaymentProvider,
    );

    let err = orders
        .bulk_action(BulkActionRequest::new(BulkAction::Cancel, ids(&[1, 2, 3])))
        .await
        .unwrap_err();

    let OrderError::InvalidBulkState { offenders, .. } = err else {
        panic!("expected InvalidBulkState, got {err:?}");
    };
    assert_eq!(offenders.len(), 1);
    assert_eq!(offenders[0].order_number, "LL-2003");

    for (id, status) in [(1, OrderStatus::Pending), (2, OrderStatus::Confirmed)] {
        let stored = orders.get(OrderId::new(id)).await.unwrap();
        assert_eq!(stored.status, status);
        assert_eq!(stored.notes, None);
    }
}

#[tokio::test]
async fn test_bulk_refund_partial_failure() {
    let orders = order_lifecycle(
        [
            order(1, OrderStatus::Delivered, PaymentStatus::Paid),
            order(2, OrderStatus::Delivered, PaymentStatus::Paid),
            order(3, OrderStatus::Processing, PaymentStatus::Paid),
        ],
        FlakyProcessor {
            declined: HashSet::from([OrderId::new(2)]),
        },
    );

    let outcome = orders
        .bulk_action(BulkActionRequest {
            reason: Some("Damaged in transit".to_string()),
            ..BulkActionRequest::new(BulkAction::Refund, ids(&[1, 2, 3]))
        })
        .await
        .unwrap();

    assert_eq!(outcome.count, 2);
    let results = outcome.results.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(
        results.iter().map(|r| r.order_id).collect::<Vec<_>>(),
        ids(&[1, 2, 3])
    );
    assert!(results[0].success && results[2].success);
    assert!(!results[1].success);
    assert_eq!(
        results[1].error.as_deref(),
        Some("payment provider unavailable: processor timeout")
    );

    let refunded = orders.get(OrderId::new(3)).await.unwrap();
    assert_eq!(refunded.status, OrderStatus::Refunded);
    assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
    assert_eq!(refunded.notes.as_deref(), Some("Damaged in transit"));

    let untouched = orders.get(OrderId::new(2)).await.unwrap();
    assert_eq!(untouched.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn test_bulk_update_status_ships_pending_orders() {
    let orders = order_lifecycle(
        [
            order(1, OrderStatus::Pending, PaymentStatus::Paid),
            order(2, OrderStatus::Pending, PaymentStatus::Paid),
        ],
        StubPaymentProvider,
    );

    let outcome = orders
        .bulk_action(BulkActionRequest {
            status: Some(OrderStatus::Shipped),
            ..BulkActionRequest::new(BulkAction::UpdateStatus, ids(&[1, 2]))
        })
        .await
        .unwrap();

    assert_eq!(outcome.count, 2);
    let listing = orders
        .list(
            &OrderFilter::Status(OrderStatus::Shipped),
            Page::new(None, None, 100),
        )
        .await
        .unwrap();
    assert_eq!(listing.total, 2);
}

// =============================================================================
// Listing and analytics
// =============================================================================

#[tokio::test]
async fn test_listing_analytics_follow_filter() {
    let orders = order_lifecycle(
        [
            order(1, OrderStatus::Delivered, PaymentStatus::Paid),
            order(2, OrderStatus::Pending, PaymentStatus::Pending),
            order(3, OrderStatus::Shipped, PaymentStatus::Paid),
            order(4, OrderStatus::Cancelled, PaymentStatus::Refunded),
        ],
        StubPaymentProvider,
    );

    let everything = orders
        .list(&OrderFilter::everything(), Page::new(Some(1), Some(2), 100))
        .await
        .unwrap();
    assert_eq!(everything.total, 4);
    assert_eq!(everything.orders.len(), 2);
    assert_eq!(everything.orders[0].order_number, "LL-2004");
    assert_eq!(everything.analytics.order_count, 4);
    assert_eq!(everything.analytics.total_revenue, Decimal::new(37_000, 2));
    assert_eq!(
        everything.analytics.average_order_value,
        Decimal::new(18_500, 2)
    );

    let paid = orders
        .list(
            &OrderFilter::PaymentStatus(PaymentStatus::Paid),
            Page::new(None, None, 100),
        )
        .await
        .unwrap();
    assert_eq!(paid.total, 2);
    assert_eq!(
        paid.analytics.status_counts.get(&OrderStatus::Delivered),
        Some(&1)
    );
    assert!(
        paid.analytics
            .payment_status_counts
            .get(&PaymentStatus::Pending)
            .is_none()
    );
}
