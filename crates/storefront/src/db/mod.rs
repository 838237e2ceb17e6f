//! Database operations for the storefront `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts (customers and admins)
//! - `categories` - Product categories
//! - `products` - Catalog
//! - `cart_items` - Per-user cart lines
//! - `orders` / `order_items` - Placed orders with price snapshots
//! - `tower_sessions.session` - Session storage (owned by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and embedded in
//! [`MIGRATOR`]. They run at startup when bootstrap is enabled, or via:
//! ```bash
//! cargo run -p tienda-cli -- migrate
//! ```

pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use thiserror::Error;

pub use cart::{CartChange, CartRepository};
pub use categories::CategoryRepository;
pub use orders::{CheckoutOutcome, OrderRepository, OrderStats, StatusActor, StatusChange};
pub use products::ProductRepository;
pub use users::UserRepository;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, referenced row).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique and foreign-key violations to `Conflict`, everything else to `Database`.
    pub(crate) fn from_constraint(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
        {
            return Self::Conflict(what.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `log_statements` - Emit every statement through sqlx's logging
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be established.
pub async fn create_pool(
    database_url: &SecretString,
    log_statements: bool,
) -> Result<PgPool, sqlx::Error> {
    let mut options = PgConnectOptions::from_str(database_url.expose_secret())?;
    if !log_statements {
        options = options.disable_statement_logging();
    }

    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history is inconsistent.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
