//! Baseline data so a fresh database is usable without manual setup.
//!
//! Everything runs in one transaction. The admin account and the categories
//! are only created when missing. Sample products come with a freshly created
//! catalog, or after an explicitly requested product reset.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use tienda_core::{Email, Price, UserRole};

use super::auth::{AuthError, hash_password};

/// Default seed admin email.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@tienda.com";

/// Default seed admin password. A warning is logged whenever it is used.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Display name of the seeded admin.
pub const ADMIN_NAME: &str = "Admin";

/// Categories created in an empty catalog.
pub const DEFAULT_CATEGORIES: [&str; 5] = ["Running", "Casual", "Basketball", "Skate", "Outdoor"];

/// A sample product row.
#[derive(Debug, Clone, Copy)]
pub struct SampleProduct {
    pub name: &'static str,
    pub description: &'static str,
    pub price: i64,
    pub stock: i32,
    pub category: &'static str,
}

/// Products inserted into an empty catalog (or after a reset).
pub const SAMPLE_PRODUCTS: [SampleProduct; 3] = [
    SampleProduct {
        name: "Zapatilla Runner Pro",
        description: "Ligera y rápida para correr",
        price: 299_000,
        stock: 20,
        category: "Running",
    },
    SampleProduct {
        name: "Zapatilla Urbana",
        description: "Cómoda para el día a día",
        price: 199_000,
        stock: 35,
        category: "Casual",
    },
    SampleProduct {
        name: "Zapatilla Dunk Shot",
        description: "Estilo basketball clásico",
        price: 259_000,
        stock: 15,
        category: "Basketball",
    },
];

/// What to seed.
#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub admin_email: Email,
    pub admin_password: SecretString,
    /// Delete every product and reinsert the samples.
    pub reset_products: bool,
}

/// What the seed run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub categories_inserted: usize,
    pub products_removed: u64,
    pub products_inserted: usize,
}

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to hash admin password: {0}")]
    Hash(#[from] AuthError),

    #[error("invalid sample price for {0}")]
    InvalidPrice(&'static str),
}

/// Seed the admin account, categories and sample products.
///
/// # Errors
///
/// Returns `SeedError` if any statement fails; nothing is committed then.
pub async fn run(pool: &PgPool, options: &SeedOptions) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();
    let mut tx = pool.begin().await?;

    let admin_exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(&options.admin_email)
            .fetch_one(&mut *tx)
            .await?;

    if !admin_exists {
        if options.admin_password.expose_secret() == DEFAULT_ADMIN_PASSWORD {
            warn!(
                email = %options.admin_email,
                "Seeding admin with the default password; change it before going live"
            );
        }
        let password_hash = hash_password(options.admin_password.expose_secret())?;
        sqlx::query("INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4)")
            .bind(ADMIN_NAME)
            .bind(&options.admin_email)
            .bind(&password_hash)
            .bind(UserRole::Admin)
            .execute(&mut *tx)
            .await?;
        report.admin_created = true;
    }

    let category_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(&mut *tx)
        .await?;
    if category_count == 0 {
        for name in DEFAULT_CATEGORIES {
            sqlx::query("INSERT INTO categories (name) VALUES ($1)")
                .bind(name)
                .execute(&mut *tx)
                .await?;
        }
        report.categories_inserted = DEFAULT_CATEGORIES.len();
    }

    if options.reset_products {
        report.products_removed = sqlx::query("DELETE FROM products")
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }

    // Samples belong to a fresh catalog. Once the categories exist, an empty
    // product table is the admin's choice and is left alone.
    let fresh_catalog = report.categories_inserted > 0;
    if fresh_catalog || options.reset_products {
        let product_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *tx)
            .await?;
        if product_count == 0 {
            for sample in SAMPLE_PRODUCTS {
                insert_sample(&mut *tx, &sample).await?;
            }
            report.products_inserted = SAMPLE_PRODUCTS.len();
        }
    }

    tx.commit().await?;

    info!(
        admin_created = report.admin_created,
        categories_inserted = report.categories_inserted,
        products_removed = report.products_removed,
        products_inserted = report.products_inserted,
        "Seed complete"
    );

    Ok(report)
}

/// Insert one sample product, recreating its category if an admin removed it.
async fn insert_sample(
    tx: &mut sqlx::PgConnection,
    sample: &SampleProduct,
) -> Result<(), SeedError> {
    let price = Price::from_minor(sample.price).map_err(|_| SeedError::InvalidPrice(sample.name))?;

    sqlx::query("INSERT INTO categories (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
        .bind(sample.category)
        .execute(&mut *tx)
        .await?;
    let category_id: i32 = sqlx::query_scalar("SELECT id FROM categories WHERE name = $1")
        .bind(sample.category)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query(
        r"
        INSERT INTO products (name, description, price, stock, category_id)
        VALUES ($1, $2, $3, $4, $5)
        ",
    )
    .bind(sample.name)
    .bind(sample.description)
    .bind(price)
    .bind(sample.stock)
    .bind(category_id)
    .execute(&mut *tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_products_reference_default_categories() {
        for sample in SAMPLE_PRODUCTS {
            assert!(
                DEFAULT_CATEGORIES.contains(&sample.category),
                "{} -> {}",
                sample.name,
                sample.category
            );
            assert!(sample.price >= 0);
            assert!(sample.stock >= 0);
        }
    }

    #[test]
    fn test_sample_product_names_are_unique() {
        let mut names: Vec<_> = SAMPLE_PRODUCTS.iter().map(|p| p.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SAMPLE_PRODUCTS.len());
    }

    #[test]
    fn test_default_admin_email_parses() {
        assert!(Email::parse(DEFAULT_ADMIN_EMAIL).is_ok());
    }
}
