//! Checkout and order lifecycle.

use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use tienda_core::{OrderId, OrderStatus, UserId};

use crate::db::{
    CheckoutOutcome, OrderRepository, RepositoryError, StatusActor, StatusChange,
};
use crate::models::{CurrentUser, Order, OrderWithItems};

/// Errors that can occur while placing or changing orders.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("insufficient stock for {product_name}: {available} available")]
    InsufficientStock { product_name: String, available: i32 },

    #[error("order total overflow")]
    TotalOverflow,

    #[error("order not found")]
    NotFound,

    #[error("cannot change order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl OrderError {
    /// Message for the flash shown to the shopper, or `None` for server errors.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::EmptyCart => Some("Tu carrito está vacío".to_owned()),
            Self::InsufficientStock {
                product_name,
                available,
            } => Some(format!(
                "Stock insuficiente para {product_name} (disponibles: {available})"
            )),
            Self::TotalOverflow => Some("El total del pedido es demasiado grande".to_owned()),
            Self::NotFound => Some("Pedido no encontrado".to_owned()),
            Self::InvalidTransition { from, to } => Some(format!(
                "No se puede pasar un pedido de {} a {}",
                from.label(),
                to.label()
            )),
            Self::Repository(_) => None,
        }
    }
}

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// Place an order from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyCart` or `OrderError::InsufficientStock` when
    /// the cart cannot be checked out; nothing is changed in that case.
    pub async fn checkout(&self, user_id: UserId) -> Result<Order, OrderError> {
        match self.orders.checkout(user_id).await? {
            CheckoutOutcome::Placed(order) => {
                info!(order_id = %order.id, user_id = %user_id, total = %order.total, "Order placed");
                Ok(order)
            }
            CheckoutOutcome::EmptyCart => Err(OrderError::EmptyCart),
            CheckoutOutcome::InsufficientStock {
                product_name,
                available,
            } => Err(OrderError::InsufficientStock {
                product_name,
                available,
            }),
            CheckoutOutcome::TotalOverflow => Err(OrderError::TotalOverflow),
        }
    }

    /// Load an order the viewer may see: their own, or any for admins.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order doesn't exist or belongs to
    /// someone else.
    pub async fn get_for(
        &self,
        viewer: &CurrentUser,
        id: OrderId,
    ) -> Result<OrderWithItems, OrderError> {
        match self.orders.get(id).await? {
            Some(order) if viewer.is_admin() || order.order.user_id == viewer.id => Ok(order),
            _ => Err(OrderError::NotFound),
        }
    }

    /// The owner cancels a pending order; stock is restored.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` for someone else's order and
    /// `OrderError::InvalidTransition` once it is no longer pending.
    pub async fn cancel_own(&self, user_id: UserId, id: OrderId) -> Result<Order, OrderError> {
        self.change(id, OrderStatus::Cancelled, StatusActor::Owner(user_id))
            .await
    }

    /// Admin status change following the lifecycle rules.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidTransition` if the move is not allowed.
    pub async fn set_status(&self, id: OrderId, to: OrderStatus) -> Result<Order, OrderError> {
        self.change(id, to, StatusActor::Admin).await
    }

    async fn change(
        &self,
        id: OrderId,
        to: OrderStatus,
        actor: StatusActor,
    ) -> Result<Order, OrderError> {
        match self.orders.change_status(id, to, actor).await? {
            StatusChange::Updated(order) => {
                info!(order_id = %id, status = %to, "Order status changed");
                Ok(order)
            }
            StatusChange::NotFound => Err(OrderError::NotFound),
            StatusChange::Rejected { from, to } => Err(OrderError::InvalidTransition { from, to }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_message_names_product() {
        let err = OrderError::InsufficientStock {
            product_name: "Zapatilla Urbana".to_owned(),
            available: 2,
        };
        assert_eq!(
            err.user_message().as_deref(),
            Some("Stock insuficiente para Zapatilla Urbana (disponibles: 2)")
        );
    }

    #[test]
    fn test_transition_message_uses_labels() {
        let err = OrderError::InvalidTransition {
            from: OrderStatus::Shipped,
            to: OrderStatus::Cancelled,
        };
        assert_eq!(
            err.user_message().as_deref(),
            Some("No se puede pasar un pedido de Enviado a Cancelado")
        );
    }
}
