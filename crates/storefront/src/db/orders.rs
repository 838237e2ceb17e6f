//! Order repository: checkout, listing and status changes.
//!
//! Checkout and status changes run in a transaction and lock the rows they
//! touch (`FOR UPDATE`), so stock never goes negative and concurrent status
//! changes serialize.

use sqlx::{PgConnection, PgPool};

use tienda_core::{OrderId, OrderStatus, Price, UserId};

use super::RepositoryError;
use crate::models::{Cart, CartLine, Order, OrderItem, OrderSummary, OrderWithItems};

const ORDER_COLUMNS: &str = "id, user_id, status, total, created_at, updated_at";

const SUMMARY_SELECT: &str = r"
    SELECT o.id, o.user_id, u.name AS customer_name, u.email AS customer_email,
           o.status, o.total, o.created_at,
           COALESCE((SELECT SUM(oi.quantity) FROM order_items oi WHERE oi.order_id = o.id), 0)::BIGINT
               AS item_count
    FROM orders o
    JOIN users u ON u.id = o.user_id
";

/// Result of a checkout attempt.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// The order was created, stock decremented and the cart emptied.
    Placed(Order),
    /// Nothing to check out.
    EmptyCart,
    /// A line asks for more than is in stock. Nothing was changed.
    InsufficientStock { product_name: String, available: i32 },
    /// The order total does not fit in the price type.
    TotalOverflow,
}

/// Who is asking for a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusActor {
    /// Administrators may apply any allowed transition to any order.
    Admin,
    /// A shopper may only cancel their own pending orders.
    Owner(UserId),
}

/// Result of a status change.
#[derive(Debug)]
pub enum StatusChange {
    Updated(Order),
    NotFound,
    Rejected { from: OrderStatus, to: OrderStatus },
}

/// Dashboard figures.
#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub struct OrderStats {
    pub orders: i64,
    pub pending: i64,
    /// Sum of totals of orders that are not cancelled.
    pub revenue: Price,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Turn the user's cart into an order.
    ///
    /// Product rows are locked in id order, stock is checked for every line,
    /// the order and its snapshot lines are written, stock is decremented and
    /// the cart is cleared, all in one transaction. Any early outcome rolls
    /// the transaction back untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn checkout(&self, user_id: UserId) -> Result<CheckoutOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let lines = sqlx::query_as::<_, CartLine>(
            r"
            SELECT ci.product_id, p.name, p.image_url, p.price, p.stock, ci.quantity
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.user_id = $1
            ORDER BY p.id
            FOR UPDATE OF p
            ",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        let Ok(cart) = Cart::from_lines(lines) else {
            return Ok(CheckoutOutcome::TotalOverflow);
        };
        if cart.is_empty() {
            return Ok(CheckoutOutcome::EmptyCart);
        }
        if let Some(line) = cart.first_unavailable() {
            return Ok(CheckoutOutcome::InsufficientStock {
                product_name: line.name.clone(),
                available: line.stock,
            });
        }

        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (user_id, status, total) VALUES ($1, $2, $3)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(OrderStatus::Pending)
        .bind(cart.total)
        .fetch_one(&mut *tx)
        .await?;

        for line in &cart.lines {
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_id, product_name, unit_price, quantity)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(order.id)
            .bind(line.product_id)
            .bind(&line.name)
            .bind(line.price)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;

            sqlx::query("UPDATE products SET stock = stock - $2, updated_at = now() WHERE id = $1")
                .bind(line.product_id)
                .bind(line.quantity)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(CheckoutOutcome::Placed(order))
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrderSummary>, RepositoryError> {
        let orders = sqlx::query_as::<_, OrderSummary>(&format!(
            "{SUMMARY_SELECT} WHERE o.user_id = $1 ORDER BY o.created_at DESC, o.id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(orders)
    }

    /// All orders, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let orders = sqlx::query_as::<_, OrderSummary>(&format!(
            "{SUMMARY_SELECT} WHERE ($1::order_status IS NULL OR o.status = $1)
             ORDER BY o.created_at DESC, o.id DESC"
        ))
        .bind(status)
        .fetch_all(self.pool)
        .await?;
        Ok(orders)
    }

    /// Get an order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<OrderWithItems>, RepositoryError> {
        let Some(order) = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, product_name, unit_price, quantity
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderWithItems { order, items }))
    }

    /// Move an order to a new status.
    ///
    /// Cancelling returns the ordered quantities to stock for lines whose
    /// product still exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn change_status(
        &self,
        id: OrderId,
        to: OrderStatus,
        actor: StatusActor,
    ) -> Result<StatusChange, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let Some((owner, from)) = sqlx::query_as::<_, (UserId, OrderStatus)>(
            "SELECT user_id, status FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(StatusChange::NotFound);
        };

        if let StatusActor::Owner(user_id) = actor {
            if owner != user_id {
                return Ok(StatusChange::NotFound);
            }
            if !(from == OrderStatus::Pending && to == OrderStatus::Cancelled) {
                return Ok(StatusChange::Rejected { from, to });
            }
        }
        if !from.can_transition_to(to) {
            return Ok(StatusChange::Rejected { from, to });
        }

        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $2, updated_at = now() WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(to)
        .fetch_one(&mut *tx)
        .await?;

        if to == OrderStatus::Cancelled {
            restock(&mut *tx, id).await?;
        }

        tx.commit().await?;
        Ok(StatusChange::Updated(order))
    }

    /// Dashboard figures.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<OrderStats, RepositoryError> {
        let stats = sqlx::query_as::<_, OrderStats>(
            r"
            SELECT COUNT(*) AS orders,
                   COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                   COALESCE(SUM(total) FILTER (WHERE status <> 'cancelled'), 0)::BIGINT AS revenue
            FROM orders
            ",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(stats)
    }
}

async fn restock(conn: &mut PgConnection, order_id: OrderId) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        UPDATE products p
        SET stock = p.stock + oi.quantity, updated_at = now()
        FROM order_items oi
        WHERE oi.order_id = $1 AND oi.product_id = p.id
        ",
    )
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(())
}
