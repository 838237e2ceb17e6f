//! Admin order management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tienda_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::AppError;
use crate::extract::{Form, Path};
use crate::filters;
use crate::middleware::{PageContext, RequireAdmin, push_flash};
use crate::models::{FlashLevel, OrderSummary};
use crate::services::{OrderError, OrderService};
use crate::state::AppState;

/// `?status=` filter.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
}

/// Status change form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct AdminOrdersTemplate {
    pub page: PageContext,
    pub orders: Vec<OrderSummary>,
    pub status_filter: Option<OrderStatus>,
}

impl AdminOrdersTemplate {
    /// Statuses the order may move to next.
    fn next_statuses(&self, order: &OrderSummary) -> Vec<OrderStatus> {
        OrderStatus::ALL
            .into_iter()
            .filter(|s| order.status.can_transition_to(*s))
            .collect()
    }

    fn statuses(&self) -> [OrderStatus; 5] {
        OrderStatus::ALL
    }

    fn is_filtered_by(&self, status: &OrderStatus) -> bool {
        self.status_filter == Some(*status)
    }
}

/// All orders, optionally filtered by status.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    page: PageContext,
    Query(query): Query<OrdersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let status_filter = query
        .status
        .as_deref()
        .and_then(|s| s.parse::<OrderStatus>().ok());
    let orders = OrderRepository::new(state.pool())
        .list_all(status_filter)
        .await?;

    Ok(AdminOrdersTemplate {
        page,
        orders,
        status_filter,
    })
}

/// Move an order to a new status.
#[instrument(skip_all, fields(admin_id = %admin.id, order_id = %id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect, AppError> {
    let Ok(status) = form.status.parse::<OrderStatus>() else {
        push_flash(&session, FlashLevel::Warning, "Estado inválido").await;
        return Ok(Redirect::to("/admin/orders"));
    };

    match OrderService::new(state.pool()).set_status(id, status).await {
        Ok(order) => {
            push_flash(
                &session,
                FlashLevel::Success,
                format!("Pedido #{} ahora está {}", order.id, order.status.label()),
            )
            .await;
        }
        Err(e @ (OrderError::InvalidTransition { .. } | OrderError::NotFound)) => {
            if let Some(message) = e.user_message() {
                push_flash(&session, FlashLevel::Warning, message).await;
            }
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to("/admin/orders"))
}
