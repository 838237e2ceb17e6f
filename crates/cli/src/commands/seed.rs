//! Seed the database with the admin account, categories and sample products.

use secrecy::SecretString;
use sqlx::PgPool;

use tienda_core::Email;
use tienda_storefront::services::{SeedOptions, seed};

use super::CommandError;

/// Run the seed routine against an already-migrated database.
pub async fn run(
    pool: &PgPool,
    admin_email: &str,
    admin_password: SecretString,
    reset_products: bool,
) -> Result<(), CommandError> {
    let options = SeedOptions {
        admin_email: Email::parse(admin_email)?,
        admin_password,
        reset_products,
    };

    if reset_products {
        tracing::warn!("Resetting products: every product will be deleted and the samples reinserted");
    }

    seed::run(pool, &options).await?;
    Ok(())
}
