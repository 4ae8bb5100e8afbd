//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::orders::{OrderLifecycle, PgOrderStore, StubPaymentProvider};

/// Order lifecycle as wired in production.
pub type Orders = OrderLifecycle<PgOrderStore, StubPaymentProvider>;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    orders: Orders,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let orders = OrderLifecycle::new(PgOrderStore::new(pool.clone()), StubPaymentProvider);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                orders,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Order lifecycle manager.
    #[must_use]
    pub fn orders(&self) -> &Orders {
        &self.inner.orders
    }
}
