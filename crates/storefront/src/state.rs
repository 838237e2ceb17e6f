//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Built once at startup and handed to the
/// router; handlers reach the pool and configuration through it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pool }),
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
}
