//! Order lifecycle: storage, status transitions, bulk actions and analytics.
//!
//! [`OrderLifecycle`] owns every business rule. It reads and writes through an
//! [`OrderStore`] and refunds through a [`PaymentProvider`], so the same rules
//! run against [`PgOrderStore`] in production and [`InMemoryOrderStore`] in
//! tests.

mod analytics;
mod bulk;
mod error;
mod filter;
mod lifecycle;
mod memory;
mod payment;
mod postgres;

use std::future::Future;

use linen_loft_core::{OrderId, OrderStatus};

use crate::db::RepositoryError;
use crate::models::{Order, OrderUpdate};

pub use analytics::OrderAnalytics;
pub use bulk::{BulkAction, BulkActionRequest, BulkOutcome, RefundResult};
pub use error::{BulkStateOffender, OrderError};
pub use filter::{DEFAULT_PER_PAGE, OrderFilter, Page};
pub use lifecycle::{OrderLifecycle, OrderListing, SHIPPING_ESTIMATE_DAYS, StatusUpdate};
pub use memory::InMemoryOrderStore;
pub use payment::{PaymentError, PaymentProvider, StubPaymentProvider};
pub use postgres::PgOrderStore;

/// Persistent order storage.
///
/// Every returned [`Order`] carries its line items.
pub trait OrderStore: Send + Sync {
    /// Fetch a single order.
    fn get_by_id(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<Order>, RepositoryError>> + Send;

    /// Apply `update` to one order and return it.
    ///
    /// Returns [`RepositoryError::NotFound`] if the order does not exist.
    fn update_by_id(
        &self,
        id: OrderId,
        update: &OrderUpdate,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;

    /// Apply `update` to every listed order that exists and is not currently
    /// in one of `unless_status`, returning how many rows changed.
    ///
    /// The status check and the write happen in one atomic step.
    fn update_many(
        &self,
        ids: &[OrderId],
        update: &OrderUpdate,
        unless_status: &[OrderStatus],
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;

    /// Fetch every listed order that exists. Missing ids are skipped.
    fn find_many(
        &self,
        ids: &[OrderId],
    ) -> impl Future<Output = Result<Vec<Order>, RepositoryError>> + Send;

    /// One page of orders matching `filter`, newest first, plus the total
    /// number of matches.
    fn list(
        &self,
        filter: &OrderFilter,
        page: Page,
    ) -> impl Future<Output = Result<(Vec<Order>, u64), RepositoryError>> + Send;

    /// Analytics over every order matching `filter`.
    fn aggregate(
        &self,
        filter: &OrderFilter,
    ) -> impl Future<Output = Result<OrderAnalytics, RepositoryError>> + Send;
}

#[cfg(test)]
pub(crate) mod tests_support {
    use std::collections::HashSet;

    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use linen_loft_core::{OrderStatus, PaymentStatus};

    use super::*;

    /// An unpaid order numbered `LL-{1000 + id}`, created `id` hours into
    /// 2026-03-01.
    pub fn order(id: i32, status: OrderStatus) -> Order {
        let base = Utc
            .with_ymd_and_hms(2026, 3, 1, 0, 0, 0)
            .single()
            .unwrap_or_default();
        let created = base + Duration::hours(i64::from(id));
        Order {
            id: OrderId::new(id),
            order_number: format!("LL-{}", 1000 + id),
            status,
            payment_status: PaymentStatus::Pending,
            tracking_number: None,
            notes: None,
            estimated_delivery: None,
            total: Decimal::new(12900, 2),
            created_at: created,
            updated_at: created,
            items: vec![],
        }
    }

    pub fn paid(mut order: Order) -> Order {
        order.payment_status = PaymentStatus::Paid;
        order
    }

    pub fn lifecycle(
        orders: impl IntoIterator<Item = Order>,
    ) -> OrderLifecycle<InMemoryOrderStore, StubPaymentProvider> {
        lifecycle_with(orders, StubPaymentProvider)
    }

    pub fn lifecycle_with<P: PaymentProvider>(
        orders: impl IntoIterator<Item = Order>,
        payments: P,
    ) -> OrderLifecycle<InMemoryOrderStore, P> {
        OrderLifecycle::new(InMemoryOrderStore::new(orders), payments)
    }

    /// Declines refunds for a fixed set of orders.
    #[derive(Debug, Default)]
    pub struct DecliningProvider {
        declined: HashSet<OrderId>,
    }

    impl DecliningProvider {
        pub fn for_ids(ids: impl IntoIterator<Item = OrderId>) -> Self {
            Self {
                declined: ids.into_iter().collect(),
            }
        }
    }

    impl PaymentProvider for DecliningProvider {
        async fn refund(&self, order: &Order) -> Result<(), PaymentError> {
            if self.declined.contains(&order.id) {
                return Err(PaymentError::Declined("card issuer refused".into()));
            }
            Ok(())
        }
    }
}
