//! Admin area, mounted under `/admin`. Every handler requires `RequireAdmin`.

pub mod categories;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/products", get(products::index))
        .route("/products/new", get(products::new_page).post(products::create))
        .route(
            "/products/{id}/edit",
            get(products::edit_page).post(products::update),
        )
        .route("/products/{id}/delete", post(products::delete))
        .route("/categories", get(categories::index).post(categories::create))
        .route("/categories/{id}/delete", post(categories::delete))
        .route("/orders", get(orders::index))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/users", get(users::index))
        .route("/users/{id}/role", post(users::update_role))
}
