//! Bulk actions over a selection of orders.
//!
//! Every action validates the whole selection before writing anything.
//! `cancel` then runs as one multi-row update; `refund` goes through the
//! payment provider per order, so one failed refund never blocks the rest.

use std::collections::{HashMap, HashSet};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use linen_loft_core::{OrderId, OrderStatus, PaymentStatus};

use super::{BulkStateOffender, OrderError, OrderLifecycle, OrderStore, PaymentProvider};
use crate::models::{Order, OrderUpdate};

const DEFAULT_CANCEL_NOTE: &str = "Cancelled by admin";
const DEFAULT_REFUND_NOTE: &str = "Refunded by admin";

/// Statuses an order can no longer be cancelled from.
const CANCEL_BLOCKED: [OrderStatus; 3] = [
    OrderStatus::Delivered,
    OrderStatus::Refunded,
    OrderStatus::Cancelled,
];

/// Bulk action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BulkAction {
    UpdateStatus,
    AddNotes,
    Cancel,
    Refund,
}

/// A bulk action and its payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkActionRequest {
    pub action: BulkAction,
    pub order_ids: Vec<OrderId>,
    /// Target status for `updateStatus`.
    #[serde(default)]
    pub status: Option<OrderStatus>,
    /// Note text for `addNotes`.
    #[serde(default)]
    pub notes: Option<String>,
    /// Note written by `cancel` and `refund`.
    #[serde(default)]
    pub reason: Option<String>,
}

impl BulkActionRequest {
    /// A request with no payload.
    #[must_use]
    pub const fn new(action: BulkAction, order_ids: Vec<OrderId>) -> Self {
        Self {
            action,
            order_ids,
            status: None,
            notes: None,
            reason: None,
        }
    }
}

/// Per-order outcome of a refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundResult {
    pub order_id: OrderId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RefundResult {
    const fn success(order_id: OrderId) -> Self {
        Self {
            order_id,
            success: true,
            error: None,
        }
    }

    fn failure(order_id: OrderId, error: impl Into<String>) -> Self {
        Self {
            order_id,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Result of a bulk action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Orders actually changed.
    pub count: u64,
    /// One entry per requested id, in request order. Refunds only; a
    /// repeated id is refunded once and its outcome repeated.
    pub results: Option<Vec<RefundResult>>,
}

impl<S: OrderStore, P: PaymentProvider> OrderLifecycle<S, P> {
    /// Run a bulk action.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptySelection`] if no ids were given
    /// - [`OrderError::MissingParameter`] if the action's payload is missing
    /// - [`OrderError::InvalidBulkState`] if any selected order blocks a
    ///   `cancel` or `refund`; nothing is written
    /// - [`OrderError::Store`] if the store fails
    #[instrument(
        skip(self, request),
        fields(action = ?request.action, selected = request.order_ids.len())
    )]
    pub async fn bulk_action(&self, request: BulkActionRequest) -> Result<BulkOutcome, OrderError> {
        if request.order_ids.is_empty() {
            return Err(OrderError::EmptySelection);
        }

        let outcome = match request.action {
            BulkAction::UpdateStatus => self.bulk_update_status(&request).await?,
            BulkAction::AddNotes => self.bulk_add_notes(&request).await?,
            BulkAction::Cancel => self.bulk_cancel(&request).await?,
            BulkAction::Refund => self.bulk_refund(&request).await?,
        };

        info!(count = outcome.count, "Bulk action applied");
        Ok(outcome)
    }

    /// Sets the status on every order without consulting the lifecycle graph.
    async fn bulk_update_status(
        &self,
        request: &BulkActionRequest,
    ) -> Result<BulkOutcome, OrderError> {
        let status = request
            .status
            .ok_or(OrderError::MissingParameter("status"))?;

        let update = OrderUpdate {
            status: Some(status),
            ..OrderUpdate::default()
        };
        let count = self
            .store
            .update_many(&request.order_ids, &update, &[])
            .await?;

        Ok(BulkOutcome {
            count,
            results: None,
        })
    }

    async fn bulk_add_notes(&self, request: &BulkActionRequest) -> Result<BulkOutcome, OrderError> {
        let notes = request
            .notes
            .as_deref()
            .filter(|notes| !notes.trim().is_empty())
            .ok_or(OrderError::MissingParameter("notes"))?;

        let update = OrderUpdate {
            notes: Some(notes.to_string()),
            ..OrderUpdate::default()
        };
        let count = self
            .store
            .update_many(&request.order_ids, &update, &[])
            .await?;

        Ok(BulkOutcome {
            count,
            results: None,
        })
    }

    async fn bulk_cancel(&self, request: &BulkActionRequest) -> Result<BulkOutcome, OrderError> {
        let orders = self.store.find_many(&request.order_ids).await?;
        ensure_all(&orders, can_cancel, "Some orders cannot be cancelled")?;

        let update = OrderUpdate {
            status: Some(OrderStatus::Cancelled),
            notes: Some(note_or(request.reason.as_deref(), DEFAULT_CANCEL_NOTE)),
            ..OrderUpdate::default()
        };
        let count = self
            .store
            .update_many(&request.order_ids, &update, &CANCEL_BLOCKED)
            .await?;
        let checked = u64::try_from(orders.len()).unwrap_or(u64::MAX);
        if count < checked {
            warn!(
                checked,
                cancelled = count,
                "Orders changed status before they could be cancelled"
            );
        }

        Ok(BulkOutcome {
            count,
            results: None,
        })
    }

    async fn bulk_refund(&self, request: &BulkActionRequest) -> Result<BulkOutcome, OrderError> {
        let orders = self.store.find_many(&request.order_ids).await?;
        ensure_all(&orders, can_refund, "Some orders cannot be refunded")?;

        let by_id: HashMap<OrderId, Order> =
            orders.into_iter().map(|order| (order.id, order)).collect();
        let update = OrderUpdate {
            status: Some(OrderStatus::Refunded),
            payment_status: Some(PaymentStatus::Refunded),
            notes: Some(note_or(request.reason.as_deref(), DEFAULT_REFUND_NOTE)),
            ..OrderUpdate::default()
        };

        let mut seen = HashSet::new();
        let outcomes: HashMap<OrderId, RefundResult> = join_all(
            request
                .order_ids
                .iter()
                .copied()
                .filter(|id| seen.insert(*id))
                .map(|id| self.refund_one(id, by_id.get(&id), &update)),
        )
        .await
        .into_iter()
        .map(|result| (result.order_id, result))
        .collect();

        let count = outcomes.values().filter(|result| result.success).count();
        let failed = outcomes.len() - count;
        if failed > 0 {
            warn!(failed, "Some refunds failed");
        }

        let results = request
            .order_ids
            .iter()
            .filter_map(|id| outcomes.get(id).cloned())
            .collect();

        Ok(BulkOutcome {
            count: u64::try_from(count).unwrap_or(u64::MAX),
            results: Some(results),
        })
    }

    async fn refund_one(
        &self,
        id: OrderId,
        order: Option<&Order>,
        update: &OrderUpdate,
    ) -> RefundResult {
        let Some(order) = order else {
            return RefundResult::failure(id, "Order not found");
        };

        if let Err(e) = self.payments.refund(order).await {
            warn!(order_id = %id, error = %e, "Refund rejected by payment provider");
            return RefundResult::failure(id, e.to_string());
        }

        match self.store.update_by_id(id, update).await {
            Ok(_) => RefundResult::success(id),
            Err(e) => {
                error!(order_id = %id, error = %e, "Refund issued but order update failed");
                RefundResult::failure(id, "Failed to update order")
            }
        }
    }
}

fn can_cancel(order: &Order) -> bool {
    !CANCEL_BLOCKED.contains(&order.status)
}

fn can_refund(order: &Order) -> bool {
    order.payment_status == PaymentStatus::Paid
        && !matches!(order.status, OrderStatus::Refunded | OrderStatus::Cancelled)
}

fn ensure_all(
    orders: &[Order],
    allowed: impl Fn(&Order) -> bool,
    message: &str,
) -> Result<(), OrderError> {
    let offenders: Vec<BulkStateOffender> = orders
        .iter()
        .filter(|order| !allowed(order))
        .map(BulkStateOffender::from)
        .collect();

    if offenders.is_empty() {
        Ok(())
    } else {
        Err(OrderError::InvalidBulkState {
            message: message.to_string(),
            offenders,
        })
    }
}

fn note_or(reason: Option<&str>, default: &str) -> String {
    reason
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .unwrap_or(default)
        .to_string()
}
