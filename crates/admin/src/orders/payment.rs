//! Payment provider seam for refunds.

use std::future::Future;

use thiserror::Error;
use tracing::info;

use crate::models::Order;

/// Errors reported by a payment provider.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The provider refused the refund.
    #[error("refund declined: {0}")]
    Declined(String),

    /// The provider could not be reached.
    #[error("payment provider unavailable: {0}")]
    Unavailable(String),
}

/// Issues refunds against the original payment.
pub trait PaymentProvider: Send + Sync {
    /// Refund the full order total.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] if the refund was not issued.
    fn refund(&self, order: &Order) -> impl Future<Output = Result<(), PaymentError>> + Send;
}

/// Provider that accepts every refund without contacting a processor.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubPaymentProvider;

impl PaymentProvider for StubPaymentProvider {
    async fn refund(&self, order: &Order) -> Result<(), PaymentError> {
        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            amount = %order.total,
            "Refund issued (stub provider)"
        );
        Ok(())
    }
}
