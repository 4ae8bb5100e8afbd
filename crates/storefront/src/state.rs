//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::catalog::PgCatalogStore;
use crate::config::StorefrontConfig;
use crate::search::{ScoringPolicy, SearchEngine};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    search: SearchEngine<PgCatalogStore>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    /// * `policy` - Scoring policy for the search engine
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool, policy: ScoringPolicy) -> Self {
        let search = SearchEngine::new(
            PgCatalogStore::new(pool.clone()),
            Arc::new(policy),
            config.search.max_limit,
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                search,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the search engine.
    #[must_use]
    pub fn search(&self) -> &SearchEngine<PgCatalogStore> {
        &self.inner.search
    }
}
