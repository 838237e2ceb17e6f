//! Order route handlers: checkout, history, detail and cancellation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use tower_sessions::Session;
use tracing::{instrument, warn};

use tienda_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::AppError;
use crate::extract::Path;
use crate::filters;
use crate::middleware::{PageContext, RequireAuth, push_flash};
use crate::models::{FlashLevel, OrderSummary, OrderWithItems};
use crate::services::{OrderError, OrderService};
use crate::state::AppState;

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub page: PageContext,
    pub orders: Vec<OrderSummary>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderTemplate {
    pub page: PageContext,
    pub detail: OrderWithItems,
    pub can_cancel: bool,
}

/// Place an order from the cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<Redirect, AppError> {
    match OrderService::new(state.pool()).checkout(user.id).await {
        Ok(order) => {
            push_flash(
                &session,
                FlashLevel::Success,
                format!("Pedido #{} realizado con éxito", order.id),
            )
            .await;
            Ok(Redirect::to(&format!("/orders/{}", order.id)))
        }
        Err(e) => match e.user_message() {
            Some(message) => {
                warn!(error = %e, "Checkout refused");
                push_flash(&session, FlashLevel::Warning, message).await;
                Ok(Redirect::to("/cart"))
            }
            None => Err(e.into()),
        },
    }
}

/// The user's orders, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(OrdersTemplate { page, orders })
}

/// Order detail, visible to its owner and to admins.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let detail = OrderService::new(state.pool()).get_for(&user, id).await?;
    let can_cancel =
        detail.order.user_id == user.id && detail.order.status == OrderStatus::Pending;

    Ok(OrderTemplate {
        page,
        detail,
        can_cancel,
    })
}

/// The owner cancels a pending order.
#[instrument(skip_all, fields(user_id = %user.id, order_id = %id))]
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Path(id): Path<OrderId>,
) -> Result<Redirect, AppError> {
    match OrderService::new(state.pool()).cancel_own(user.id, id).await {
        Ok(_) => {
            push_flash(&session, FlashLevel::Info, format!("Pedido #{id} cancelado")).await;
        }
        Err(OrderError::NotFound) => return Err(OrderError::NotFound.into()),
        Err(e @ OrderError::InvalidTransition { .. }) => {
            if let Some(message) = e.user_message() {
                push_flash(&session, FlashLevel::Warning, message).await;
            }
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to(&format!("/orders/{id}")))
}
