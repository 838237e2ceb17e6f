//! Order types.

use chrono::{DateTime, Utc};

use tienda_core::{Email, OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId};

/// An order header.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    /// Sum of the item lines, minor currency units.
    pub total: Price,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line of a placed order with name and price snapshots.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    /// `None` once the product has been deleted from the catalog.
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub unit_price: Price,
    pub quantity: i32,
}

impl OrderItem {
    /// Line total for display.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.saturating_mul(self.quantity)
    }
}

/// An order with its lines.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Order list row (admin and account pages).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderSummary {
    pub id: OrderId,
    pub user_id: UserId,
    pub customer_name: String,
    pub customer_email: Email,
    pub status: OrderStatus,
    pub total: Price,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}
