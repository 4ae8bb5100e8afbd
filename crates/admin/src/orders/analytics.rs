//! Aggregate figures over a filtered order set.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use linen_loft_core::{OrderStatus, PaymentStatus};

use crate::models::Order;

/// Revenue figures and status histograms for a set of orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAnalytics {
    pub order_count: u64,
    /// Sum of `total` over orders whose payment status is `PAID`.
    pub total_revenue: Decimal,
    /// Mean of `total` over all orders in the set.
    pub average_order_value: Decimal,
    pub status_counts: BTreeMap<OrderStatus, u64>,
    pub payment_status_counts: BTreeMap<PaymentStatus, u64>,
}

impl OrderAnalytics {
    /// Compute analytics directly from orders.
    #[must_use]
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut analytics = Self::default();
        let mut grand_total = Decimal::ZERO;

        for order in orders {
            analytics.order_count += 1;
            grand_total += order.total;
            if order.payment_status == PaymentStatus::Paid {
                analytics.total_revenue += order.total;
            }
            *analytics.status_counts.entry(order.status).or_default() += 1;
            *analytics
                .payment_status_counts
                .entry(order.payment_status)
                .or_default() += 1;
        }

        analytics.average_order_value = average(grand_total, analytics.order_count);
        analytics
    }
}

/// Mean rounded to cents; zero for an empty set.
pub(crate) fn average(sum: Decimal, count: u64) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (sum / Decimal::from(count)).round_dp(2)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use linen_loft_core::OrderId;

    use super::*;

    fn order(id: i32, status: OrderStatus, payment: PaymentStatus, cents: i64) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new(id),
            order_number: format!("LL-{id}"),
            status,
            payment_status: payment,
            tracking_number: None,
            notes: None,
            estimated_delivery: None,
            total: Decimal::new(cents, 2),
            created_at: now,
            updated_at: now,
            items: vec![],
        }
    }

    #[test]
    fn test_revenue_counts_paid_only() {
        let orders = [
            order(1, OrderStatus::Delivered, PaymentStatus::Paid, 10000),
            order(2, OrderStatus::Pending, PaymentStatus::Pending, 5000),
            order(3, OrderStatus::Shipped, PaymentStatus::Paid, 2500),
        ];

        let analytics = OrderAnalytics::from_orders(&orders);

        assert_eq!(analytics.order_count, 3);
        assert_eq!(analytics.total_revenue, Decimal::new(12500, 2));
        assert_eq!(analytics.average_order_value, Decimal::new(5833, 2));
        assert_eq!(analytics.status_counts.get(&OrderStatus::Pending), Some(&1));
        assert_eq!(
            analytics.payment_status_counts.get(&PaymentStatus::Paid),
            Some(&2)
        );
    }

    #[test]
    fn test_empty_set() {
        let analytics = OrderAnalytics::from_orders(&[]);
        assert_eq!(analytics.order_count, 0);
        assert_eq!(analytics.average_order_value, Decimal::ZERO);
        assert!(analytics.status_counts.is_empty());
    }

    #[test]
    fn test_histogram_keys_serialize_as_statuses() {
        let orders = [order(1, OrderStatus::Cancelled, PaymentStatus::Refunded, 900)];
        let json = serde_json::to_value(OrderAnalytics::from_orders(&orders)).unwrap_or_default();
        assert_eq!(json["statusCounts"]["CANCELLED"], 1);
        assert_eq!(json["paymentStatusCounts"]["REFUNDED"], 1);
        assert_eq!(json["totalRevenue"], "0");
    }
}
