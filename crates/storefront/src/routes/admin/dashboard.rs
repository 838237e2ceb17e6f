//! Admin dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};

use crate::db::{OrderRepository, OrderStats, ProductRepository, UserRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{PageContext, RequireAdmin};
use crate::models::Product;
use crate::state::AppState;

/// Products at or below this stock level are flagged.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub page: PageContext,
    pub users: i64,
    pub products: i64,
    pub stats: OrderStats,
    pub low_stock: Vec<Product>,
    pub low_stock_threshold: i32,
}

/// Dashboard with store-wide counts.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool();
    let products = ProductRepository::new(pool);

    Ok(DashboardTemplate {
        page,
        users: UserRepository::new(pool).count().await?,
        products: products.count().await?,
        stats: OrderRepository::new(pool).stats().await?,
        low_stock: products.low_stock(LOW_STOCK_THRESHOLD).await?,
        low_stock_threshold: LOW_STOCK_THRESHOLD,
    })
}
