//! Category repository.

use sqlx::PgPool;

use tienda_core::CategoryId;

use super::RepositoryError;
use crate::models::{Category, CategoryWithCount};

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
                .fetch_all(self.pool)
                .await?;
        Ok(categories)
    }

    /// All categories with their product counts (admin listing).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>, RepositoryError> {
        let categories = sqlx::query_as::<_, CategoryWithCount>(
            r"
            SELECT c.id, c.name, COUNT(p.id) AS product_count
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            GROUP BY c.id, c.name
            ORDER BY c.name
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(categories)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, name: &str) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "category name already exists"))
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` while products still reference it.
    /// Returns `RepositoryError::NotFound` if it doesn't exist.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_constraint(e, "category still has products"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
