//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use linen_loft_core::{OrderId, OrderLineItemId, OrderStatus, PaymentStatus, ProductId};

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Display number shown to staff and customers (e.g. `LL-10042`).
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderLineItem>,
}

/// A line item on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub id: OrderLineItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Field changes for one or more orders. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl OrderUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.payment_status.is_none()
            && self.tracking_number.is_none()
            && self.notes.is_none()
            && self.estimated_delivery.is_none()
    }

    /// Apply the update to an in-memory order.
    pub fn apply_to(&self, order: &mut Order, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(payment_status) = self.payment_status {
            order.payment_status = payment_status;
        }
        if let Some(tracking_number) = &self.tracking_number {
            order.tracking_number = Some(tracking_number.clone());
        }
        if let Some(notes) = &self.notes {
            order.notes = Some(notes.clone());
        }
        if let Some(estimated_delivery) = self.estimated_delivery {
            order.estimated_delivery = Some(estimated_delivery);
        }
        order.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn order() -> Order {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().unwrap_or_default();
        Order {
            id: OrderId::new(1),
            order_number: "LL-1001".to_string(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Paid,
            tracking_number: None,
            notes: Some("gift wrap".to_string()),
            estimated_delivery: None,
            total: Decimal::new(15900, 2),
            created_at: created,
            updated_at: created,
            items: vec![],
        }
    }

    #[test]
    fn test_apply_partial_update() {
        let mut order = order();
        let now = order.created_at + chrono::Duration::hours(2);
        let update = OrderUpdate {
            status: Some(OrderStatus::Confirmed),
            tracking_number: Some("1Z999".to_string()),
            ..OrderUpdate::default()
        };

        update.apply_to(&mut order, now);

        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.tracking_number.as_deref(), Some("1Z999"));
        assert_eq!(order.notes.as_deref(), Some("gift wrap"));
        assert_eq!(order.updated_at, now);
    }

    #[test]
    fn test_is_empty() {
        assert!(OrderUpdate::default().is_empty());
        assert!(
            !OrderUpdate {
                notes: Some(String::new()),
                ..OrderUpdate::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(order()).unwrap_or_default();
        assert_eq!(json["orderNumber"], "LL-1001");
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["paymentStatus"], "PAID");
        assert_eq!(json["total"], "159.00");
        assert!(json["estimatedDelivery"].is_null());
    }
}
