//! Subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use tienda_core::EmailError;
use tienda_storefront::db::RepositoryError;
use tienda_storefront::services::{AuthError, SeedError};

/// Errors surfaced by any subcommand.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Session store migration failed.
    #[error("Session store error: {0}")]
    SessionStore(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid input such as an empty name or password.
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    /// An account with this email already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    /// No account with this email.
    #[error("No user with email: {0}")]
    UserNotFound(String),

    /// Password hashing failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),
}

/// Connect to the storefront database.
///
/// Reads `STOREFRONT_DATABASE_URL`, falling back to `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, CommandError> {
    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    tracing::info!("Connecting to storefront database...");
    Ok(tienda_storefront::db::create_pool(&database_url, false).await?)
}
