//! Tienda storefront library.
//!
//! The web application (catalog, cart, orders, auth, admin) as a library so
//! the binary, the CLI and the integration tests share one router and one
//! bootstrap path.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, body::Body, http::Request, middleware::from_fn, middleware::from_fn_with_state};
use sqlx::PgPool;
use thiserror::Error;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionStore;
use tracing::info;

use crate::config::StorefrontConfig;
use crate::services::seed::{self, SeedError, SeedOptions, SeedReport};
use crate::state::AppState;

/// Build the application router over the given session store.
///
/// Layers, outermost first: trace span, request id, security headers,
/// session, current-user resolution. `/static` bypasses the session.
pub fn app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = middleware::create_session_layer(session_store, state.config());
    let static_dir = state.config().static_dir.clone();

    Router::new()
        .merge(routes::routes())
        .layer(from_fn_with_state(
            state.clone(),
            middleware::resolve_current_user,
        ))
        .layer(session_layer)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Errors during startup bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("seeding failed: {0}")]
    Seed(#[from] SeedError),
}

/// Seed options from the bootstrap configuration.
#[must_use]
pub fn seed_options(config: &StorefrontConfig) -> SeedOptions {
    SeedOptions {
        admin_email: config.bootstrap.admin_email.clone(),
        admin_password: config.bootstrap.admin_password.clone(),
        reset_products: config.bootstrap.reset_products,
    }
}

/// Apply migrations and seed baseline data.
///
/// # Errors
///
/// Returns `BootstrapError` if a migration or the seed transaction fails.
pub async fn bootstrap(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> Result<SeedReport, BootstrapError> {
    db::migrate(pool).await?;
    info!("Migrations applied");

    let report = seed::run(pool, &seed_options(config)).await?;
    Ok(report)
}
