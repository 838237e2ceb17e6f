//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Catalog (?category=<id>&q=<text>)
//! GET  /products/{id}                 - Product detail
//! GET  /health                        - Liveness
//! GET  /health/ready                  - Readiness (database ping)
//!
//! # Auth
//! GET  /auth/login                    - Login page (?next=<path>)
//! POST /auth/login                    - Login action
//! GET  /auth/register                 - Register page
//! POST /auth/register                 - Register action
//! GET  /auth/logout                   - Logout (requires auth)
//! GET  /auth/profile                  - Profile (requires auth)
//! POST /auth/profile                  - Update display name
//!
//! # Cart (requires auth)
//! GET  /cart                          - Cart page
//! POST /cart/add                      - Add units
//! POST /cart/update                   - Set quantity (0 removes)
//! POST /cart/remove                   - Remove line
//!
//! # Orders (requires auth)
//! POST /orders/checkout               - Place order from cart
//! GET  /orders                        - Order history
//! GET  /orders/{id}                   - Order detail (owner or admin)
//! POST /orders/{id}/cancel            - Cancel a pending order
//!
//! # Admin (requires admin role)
//! GET  /admin                         - Dashboard
//! GET  /admin/products                - Product list
//! GET  /admin/products/new            - New product form
//! POST /admin/products/new            - Create product
//! GET  /admin/products/{id}/edit      - Edit form
//! POST /admin/products/{id}/edit      - Save product
//! POST /admin/products/{id}/delete    - Delete product
//! GET  /admin/categories              - Categories
//! POST /admin/categories              - Create category
//! POST /admin/categories/{id}/delete  - Delete unused category
//! GET  /admin/orders                  - All orders (?status=)
//! POST /admin/orders/{id}/status      - Change order status
//! GET  /admin/users                   - Users
//! POST /admin/users/{id}/role         - Change role
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod public;

use axum::{
    Router,
    http::Uri,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .route("/profile", get(auth::profile_page).post(auth::update_profile))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/checkout", post(orders::checkout))
        .route("/{id}", get(orders::show))
        .route("/{id}/cancel", post(orders::cancel))
}

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::index))
        .route("/products/{id}", get(public::product))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/auth", auth_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .nest("/admin", admin::routes())
        .fallback(not_found)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_owned())
}
