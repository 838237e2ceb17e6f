//! Cart repository.
//!
//! Quantity changes lock the product row so two concurrent adds cannot
//! together exceed the available stock.

use sqlx::PgPool;

use tienda_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::CartLine;
use crate::models::cart::quantity_after_add;

/// Result of a cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// The line now holds `quantity` units.
    Saved { quantity: i32 },
    /// The line was removed.
    Removed,
    /// The product does not exist.
    UnknownProduct,
    /// Requested quantity was not positive.
    InvalidQuantity,
    /// Not enough stock; `available` units can still be held in total.
    InsufficientStock { available: i32 },
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's cart lines joined with current product data, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, CartLine>(
            r"
            SELECT ci.product_id, p.name, p.image_url, p.price, p.stock, ci.quantity
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.user_id = $1
            ORDER BY ci.added_at, ci.product_id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(lines)
    }

    /// Add `quantity` units of a product on top of what the cart holds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartChange, RepositoryError> {
        if quantity <= 0 {
            return Ok(CartChange::InvalidQuantity);
        }

        let mut tx = self.pool.begin().await?;

        let Some(stock) = lock_stock(&mut *tx, product_id).await? else {
            return Ok(CartChange::UnknownProduct);
        };

        let current: i32 = sqlx::query_scalar(
            "SELECT quantity FROM cart_items WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or(0);

        let Some(new_quantity) = quantity_after_add(current, quantity, stock) else {
            return Ok(CartChange::InsufficientStock { available: stock });
        };

        upsert(&mut *tx, user_id, product_id, new_quantity).await?;
        tx.commit().await?;

        Ok(CartChange::Saved {
            quantity: new_quantity,
        })
    }

    /// Set the quantity of a line; `0` removes it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartChange, RepositoryError> {
        if quantity < 0 {
            return Ok(CartChange::InvalidQuantity);
        }
        if quantity == 0 {
            self.remove(user_id, product_id).await?;
            return Ok(CartChange::Removed);
        }

        let mut tx = self.pool.begin().await?;

        let Some(stock) = lock_stock(&mut *tx, product_id).await? else {
            return Ok(CartChange::UnknownProduct);
        };
        if quantity > stock {
            return Ok(CartChange::InsufficientStock { available: stock });
        }

        upsert(&mut *tx, user_id, product_id, quantity).await?;
        tx.commit().await?;

        Ok(CartChange::Saved { quantity })
    }

    /// Remove a line. Removing a missing line is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

async fn lock_stock(
    tx: &mut sqlx::PgConnection,
    product_id: ProductId,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar("SELECT stock FROM products WHERE id = $1 FOR UPDATE")
        .bind(product_id)
        .fetch_optional(tx)
        .await
}

async fn upsert(
    tx: &mut sqlx::PgConnection,
    user_id: UserId,
    product_id: ProductId,
    quantity: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        INSERT INTO cart_items (user_id, product_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity
        ",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .execute(tx)
    .await?;
    Ok(())
}
