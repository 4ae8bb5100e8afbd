//! Single-order status changes and filtered listings.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{info, instrument};

use linen_loft_core::{OrderId, OrderStatus};

use super::{OrderAnalytics, OrderError, OrderFilter, OrderStore, Page, PaymentProvider};
use crate::db::RepositoryError;
use crate::models::{Order, OrderUpdate};

/// Days added to the ship time when an order is first marked `SHIPPED`.
pub const SHIPPING_ESTIMATE_DAYS: i64 = 7;

/// Requested change to one order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub id: OrderId,
    pub status: Option<OrderStatus>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
}

/// One page of orders with analytics over the whole filtered set.
#[derive(Debug, Clone)]
pub struct OrderListing {
    pub orders: Vec<Order>,
    pub total: u64,
    pub page: Page,
    pub analytics: OrderAnalytics,
}

/// Applies the order lifecycle rules on top of a store and payment provider.
#[derive(Debug, Clone)]
pub struct OrderLifecycle<S, P> {
    pub(super) store: S,
    pub(super) payments: P,
}

impl StatusUpdate {
    /// A request that only changes the status.
    #[must_use]
    pub const fn to_status(id: OrderId, status: OrderStatus) -> Self {
        Self {
            id,
            status: Some(status),
            tracking_number: None,
            notes: None,
        }
    }
}

impl<S: OrderStore, P: PaymentProvider> OrderLifecycle<S, P> {
    #[must_use]
    pub const fn new(store: S, payments: P) -> Self {
        Self { store, payments }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] if the order does not exist.
    pub async fn get(&self, id: OrderId) -> Result<Order, OrderError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(OrderError::NotFound(id))
    }

    /// List a page of orders and compute analytics for the same filter.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Store`] if the store fails.
    #[instrument(skip(self, filter))]
    pub async fn list(&self, filter: &OrderFilter, page: Page) -> Result<OrderListing, OrderError> {
        let ((orders, total), analytics) = futures::try_join!(
            self.store.list(filter, page),
            self.store.aggregate(filter)
        )?;

        Ok(OrderListing {
            orders,
            total,
            page,
            analytics,
        })
    }

    /// Apply a status change, tracking number or note to one order.
    ///
    /// # Errors
    ///
    /// See [`Self::update_status_at`].
    pub async fn update_status(&self, command: StatusUpdate) -> Result<Order, OrderError> {
        self.update_status_at(command, Utc::now()).await
    }

    /// Apply a status change as of `now`.
    ///
    /// A status equal to the current one is accepted and rewritten. Moving to
    /// `SHIPPED` fills in an estimated delivery of `now` plus
    /// [`SHIPPING_ESTIMATE_DAYS`] unless one is already set.
    ///
    /// # Errors
    ///
    /// - [`OrderError::NotFound`] if the order does not exist
    /// - [`OrderError::InvalidTransition`] if the lifecycle forbids the move;
    ///   nothing is written
    /// - [`OrderError::Store`] if the store fails
    #[instrument(skip(self, command, now), fields(order_id = %command.id, status = ?command.status))]
    pub async fn update_status_at(
        &self,
        command: StatusUpdate,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        let order = self.get(command.id).await?;

        let mut update = OrderUpdate {
            tracking_number: command.tracking_number,
            notes: command.notes,
            ..OrderUpdate::default()
        };

        if let Some(requested) = command.status {
            if requested != order.status && !order.status.can_transition_to(requested) {
                return Err(OrderError::InvalidTransition {
                    from: order.status,
                    to: requested,
                });
            }
            if requested == OrderStatus::Shipped && order.estimated_delivery.is_none() {
                update.estimated_delivery = Some(now + Duration::days(SHIPPING_ESTIMATE_DAYS));
            }
            update.status = Some(requested);
        }

        if update.is_empty() {
            return Ok(order);
        }

        let updated = self
            .store
            .update_by_id(command.id, &update)
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound => OrderError::NotFound(command.id),
                other => OrderError::Store(other),
            })?;

        info!(
            order_number = %updated.order_number,
            from = %order.status,
            to = %updated.status,
            "Order updated"
        );

        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::tests_support::{lifecycle, order};
    use super::*;

    #[tokio::test]
    async fn test_allowed_transition_persists_fields() {
        let orders = lifecycle([order(1, OrderStatus::Pending)]);

        let updated = orders
            .update_status(StatusUpdate {
                id: OrderId::new(1),
                status: Some(OrderStatus::Confirmed),
                tracking_number: Some("  1Z 999 ".into()),
                notes: Some("Called customer".into()),
            })
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Confirmed);
        assert_eq!(updated.tracking_number.as_deref(), Some("  1Z 999 "));
        assert_eq!(updated.notes.as_deref(), Some("Called customer"));
        assert!(updated.estimated_delivery.is_none());
    }

    #[tokio::test]
    async fn test_invalid_transition_writes_nothing() {
        let orders = lifecycle([order(1, OrderStatus::Pending)]);

        let err = orders
            .update_status(StatusUpdate {
                notes: Some("should not persist".into()),
                ..StatusUpdate::to_status(OrderId::new(1), OrderStatus::Delivered)
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered
            }
        ));
        let stored = orders.get(OrderId::new(1)).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(stored.notes, None);
    }

    #[tokio::test]
    async fn test_same_status_is_not_a_transition() {
        let orders = lifecycle([order(1, OrderStatus::Cancelled)]);

        let updated = orders
            .update_status(StatusUpdate {
                notes: Some("duplicate request".into()),
                ..StatusUpdate::to_status(OrderId::new(1), OrderStatus::Cancelled)
            })
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Cancelled);
        assert_eq!(updated.notes.as_deref(), Some("duplicate request"));
    }

    #[tokio::test]
    async fn test_shipping_sets_estimate_once() {
        let orders = lifecycle([order(1, OrderStatus::Processing)]);
        let shipped_at = Utc::now();

        let shipped = orders
            .update_status_at(
                StatusUpdate::to_status(OrderId::new(1), OrderStatus::Shipped),
                shipped_at,
            )
            .await
            .unwrap();
        let estimate = shipped_at + Duration::days(7);
        assert_eq!(shipped.estimated_delivery, Some(estimate));

        let again = orders
            .update_status_at(
                StatusUpdate::to_status(OrderId::new(1), OrderStatus::Shipped),
                shipped_at + Duration::days(2),
            )
            .await
            .unwrap();
        assert_eq!(again.estimated_delivery, Some(estimate));
    }

    #[tokio::test]
    async fn test_missing_order() {
        let orders = lifecycle([]);
        let err = orders
            .update_status(StatusUpdate::to_status(
                OrderId::new(404),
                OrderStatus::Confirmed,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound(id) if id == OrderId::new(404)));
    }

    #[tokio::test]
    async fn test_list_includes_analytics_for_filter() {
        let orders = lifecycle([
            order(1, OrderStatus::Pending),
            order(2, OrderStatus::Shipped),
            order(3, OrderStatus::Shipped),
        ]);

        let listing = orders
            .list(
                &OrderFilter::Status(OrderStatus::Shipped),
                Page::new(Some(1), Some(1), 100),
            )
            .await
            .unwrap();

        assert_eq!(listing.orders.len(), 1);
        assert_eq!(listing.total, 2);
        assert_eq!(listing.analytics.order_count, 2);
        assert_eq!(
            listing.analytics.status_counts.get(&OrderStatus::Shipped),
            Some(&2)
        );
    }
}
