use serde::Serialize;
use thiserror::Error;

use linen_loft_core::{OrderId, OrderStatus, PaymentStatus};

use crate::db::RepositoryError;
use crate::models::Order;

/// An order that blocks a bulk action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStateOffender {
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

impl From<&Order> for BulkStateOffender {
    fn from(order: &Order) -> Self {
        Self {
            order_number: order.order_number.clone(),
            status: order.status,
            payment_status: order.payment_status,
        }
    }
}

/// Errors raised by order lifecycle operations.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order {0} not found")]
    NotFound(OrderId),

    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("No orders selected")]
    EmptySelection,

    #[error("{message}")]
    InvalidBulkState {
        message: String,
        offenders: Vec<BulkStateOffender>,
    },

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl OrderError {
    /// Whether the error is the caller's fault rather than the server's.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. }
                | Self::MissingParameter(_)
                | Self::EmptySelection
                | Self::InvalidBulkState { .. }
        )
    }
}
