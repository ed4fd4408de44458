//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::PgCatalog;
use crate::services::dynamic_data::{DynamicDataService, MokaAggregationCache};

/// The concrete dynamic data engine wired to Postgres and moka.
pub type DynamicData = DynamicDataService<PgCatalog, MokaAggregationCache>;

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
    dynamic_data: DynamicData,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let dynamic_data =
            DynamicDataService::new(PgCatalog::new(pool.clone()), MokaAggregationCache::new());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                dynamic_data,
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

    /// Get a reference to the dynamic product data engine.
    #[must_use]
    pub fn dynamic_data(&self) -> &DynamicData {
        &self.inner.dynamic_data
    }
}
