//! Product repository.

use sqlx::{PgPool, Postgres, QueryBuilder};

use tienda_core::ProductId;

use super::RepositoryError;
use crate::models::{Product, ProductFilter, ProductInput};

const PRODUCT_SELECT: &str = r"
    SELECT p.id, p.name, p.description, p.price, p.stock, p.category_id,
           c.name AS category_name, p.image_url, p.created_at, p.updated_at
    FROM products p
    JOIN categories c ON c.id = p.category_id
";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching a filter, newest first.
    ///
    /// The search term matches name or description, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new(PRODUCT_SELECT);
        query.push(" WHERE TRUE");

        if let Some(category) = filter.category {
            query.push(" AND p.category_id = ").push_bind(category);
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(search));
            query
                .push(" AND (p.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        query.push(" ORDER BY p.created_at DESC, p.id DESC");

        let products = query
            .build_query_as::<Product>()
            .fetch_all(self.pool)
            .await?;
        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(product)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the category doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &ProductInput) -> Result<ProductId, RepositoryError> {
        sqlx::query_scalar::<_, ProductId>(
            r"
            INSERT INTO products (name, description, price, stock, category_id, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .bind(input.category_id)
        .bind(input.image_url.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "category does not exist"))
    }

    /// Overwrite a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if the category doesn't exist.
    pub async fn update(&self, id: ProductId, input: &ProductInput) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET name = $2, description = $3, price = $4, stock = $5,
                category_id = $6, image_url = $7, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .bind(input.category_id)
        .bind(input.image_url.as_deref())
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "category does not exist"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a product. Cart lines go with it; order lines keep their snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Count all products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Products with stock at or below `threshold`, lowest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn low_stock(&self, threshold: i32) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "{PRODUCT_SELECT} WHERE p.stock <= $1 ORDER BY p.stock, p.name"
        ))
        .bind(threshold)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
