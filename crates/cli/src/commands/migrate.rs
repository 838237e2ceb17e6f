//! Database migration command.
//!
//! Applies the embedded storefront migrations (`crates/storefront/migrations/`)
//! and creates the session store schema.

use sqlx::PgPool;
use tower_sessions_sqlx_store::PostgresStore;

use super::CommandError;

/// Apply all pending migrations.
pub async fn run(pool: &PgPool) -> Result<(), CommandError> {
    tracing::info!("Running storefront migrations...");
    tienda_storefront::db::migrate(pool).await?;

    tracing::info!("Running session store migrations...");
    PostgresStore::new(pool.clone())
        .migrate()
        .await
        .map_err(|e| CommandError::SessionStore(e.to_string()))?;

    tracing::info!("Migrations complete!");
    Ok(())
}
