//! In-memory order store.

use std::sync::{PoisonError, RwLock};

use chrono::Utc;

use linen_loft_core::{OrderId, OrderStatus};

use super::{OrderAnalytics, OrderFilter, OrderStore, Page};
use crate::db::RepositoryError;
use crate::models::{Order, OrderUpdate};

/// Orders held in memory.
///
/// Used by tests and local experiments. Writes take a single lock, so each
/// `update_many` is atomic like its SQL counterpart.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderStore {
    /// Create a store holding `orders`.
    #[must_use]
    pub fn new(orders: impl IntoIterator<Item = Order>) -> Self {
        Self {
            orders: RwLock::new(orders.into_iter().collect()),
        }
    }

    /// Copy of every stored order, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::DataCorruption`] if the lock is poisoned.
    pub fn snapshot(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.orders.read().map_err(poisoned)?.clone())
    }

    fn matching(&self, filter: &OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let orders = self.orders.read().map_err(poisoned)?;
        let mut matching: Vec<Order> = orders
            .iter()
            .filter(|order| filter.matches(order))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matching)
    }
}

fn poisoned<T>(_: PoisonError<T>) -> RepositoryError {
    RepositoryError::DataCorruption("order store lock poisoned".to_string())
}

impl OrderStore for InMemoryOrderStore {
    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let orders = self.orders.read().map_err(poisoned)?;
        Ok(orders.iter().find(|order| order.id == id).cloned())
    }

    async fn update_by_id(
        &self,
        id: OrderId,
        update: &OrderUpdate,
    ) -> Result<Order, RepositoryError> {
        let mut orders = self.orders.write().map_err(poisoned)?;
        let order = orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or(RepositoryError::NotFound)?;
        update.apply_to(order, Utc::now());
        Ok(order.clone())
    }

    async fn update_many(
        &self,
        ids: &[OrderId],
        update: &OrderUpdate,
        unless_status: &[OrderStatus],
    ) -> Result<u64, RepositoryError> {
        let now = Utc::now();
        let mut orders = self.orders.write().map_err(poisoned)?;
        let mut count = 0;
        for order in orders
            .iter_mut()
            .filter(|order| ids.contains(&order.id) && !unless_status.contains(&order.status))
        {
            update.apply_to(order, now);
            count += 1;
        }
        Ok(count)
    }

    async fn find_many(&self, ids: &[OrderId]) -> Result<Vec<Order>, RepositoryError> {
        let orders = self.orders.read().map_err(poisoned)?;
        Ok(orders
            .iter()
            .filter(|order| ids.contains(&order.id))
            .cloned()
            .collect())
    }

    async fn list(
        &self,
        filter: &OrderFilter,
        page: Page,
    ) -> Result<(Vec<Order>, u64), RepositoryError> {
        let matching = self.matching(filter)?;
        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let orders = matching
            .into_iter()
            .skip(offset)
            .take(usize::try_from(page.per_page).unwrap_or(usize::MAX))
            .collect();
        Ok((orders, total))
    }

    async fn aggregate(&self, filter: &OrderFilter) -> Result<OrderAnalytics, RepositoryError> {
        let matching = self.matching(filter)?;
        Ok(OrderAnalytics::from_orders(&matching))
    }
}
