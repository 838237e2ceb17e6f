//! Database tests for accounts, seeding, cart, checkout and order status.
//!
//! Each test gets a fresh, migrated database from `#[sqlx::test]`.
//!
//! Run with: `DATABASE_URL=postgres://... cargo test -p tienda-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use secrecy::SecretString;
use sqlx::PgPool;

use tienda_core::{CategoryId, Email, OrderStatus, Price, ProductId, UserRole};
use tienda_integration_tests::{
    body_text, get, location, post_form, send, session_cookie, test_app,
};
use tienda_storefront::db::{
    CartChange, CartRepository, CategoryRepository, OrderRepository, ProductRepository,
    UserRepository,
};
use tienda_storefront::models::{ProductInput, User};
use tienda_storefront::services::auth::hash_password;
use tienda_storefront::services::seed::{self, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD};
use tienda_storefront::services::{AuthError, AuthService, OrderError, OrderService, SeedOptions};

// =============================================================================
// Helpers
// =============================================================================

async fn create_user(pool: &PgPool, email: &str, role: UserRole) -> User {
    let hash = hash_password("secreta123").unwrap();
    UserRepository::new(pool)
        .create("Cliente", &Email::parse(email).unwrap(), &hash, role)
        .await
        .unwrap()
}

async fn create_category(pool: &PgPool) -> CategoryId {
    CategoryRepository::new(pool).create("Running").await.unwrap().id
}

async fn create_product(pool: &PgPool, category_id: CategoryId, name: &str, price: i64, stock: i32) -> ProductId {
    ProductRepository::new(pool)
        .create(&ProductInput {
            name: name.to_owned(),
            description: String::new(),
            price: Price::from_minor(price).unwrap(),
            stock,
            category_id,
            image_url: None,
        })
        .await
        .unwrap()
}

async fn stock_of(pool: &PgPool, id: ProductId) -> i32 {
    ProductRepository::new(pool).get(id).await.unwrap().unwrap().stock
}

fn seed_options(reset_products: bool) -> SeedOptions {
    SeedOptions {
        admin_email: Email::parse(DEFAULT_ADMIN_EMAIL).unwrap(),
        admin_password: SecretString::from(DEFAULT_ADMIN_PASSWORD),
        reset_products,
    }
}

// =============================================================================
// Accounts
// =============================================================================

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_register_rejects_duplicate_email(pool: PgPool) {
    let auth = AuthService::new(&pool);

    let user = auth.register("Ana", "ana@example.com", "secreta").await.unwrap();
    assert_eq!(user.role, UserRole::Customer);

    let err = auth
        .register("Otra Ana", "ANA@example.com", "otra")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UserAlreadyExists));

    assert_eq!(UserRepository::new(&pool).count().await.unwrap(), 1);
}

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_login_verifies_hash_and_ignores_email_case(pool: PgPool) {
    let auth = AuthService::new(&pool);
    let registered = auth.register("Ana", "ana@example.com", "secreta").await.unwrap();

    let user = auth.login(" ANA@Example.COM ", "secreta").await.unwrap();
    assert_eq!(user.id, registered.id);

    assert!(matches!(
        auth.login("ana@example.com", "Secreta").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        auth.login("nadie@example.com", "secreta").await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_profile_update_changes_only_name(pool: PgPool) {
    let auth = AuthService::new(&pool);
    let before = auth.register("Ana", "ana@example.com", "secreta").await.unwrap();

    let after = auth
        .update_profile(before.id, Some("  Ana María "))
        .await
        .unwrap();
    assert_eq!(after.name, "Ana María");
    assert_eq!(after.email, before.email);
    assert_eq!(after.role, before.role);
    assert_eq!(after.created_at, before.created_at);

    assert!(matches!(
        auth.update_profile(before.id, Some("   ")).await,
        Err(AuthError::BlankName)
    ));
    let unchanged = auth.update_profile(before.id, None).await.unwrap();
    assert_eq!(unchanged.name, "Ana María");

    // The password still works after the profile edit.
    auth.login("ana@example.com", "secreta").await.unwrap();
}

// =============================================================================
// Seeding
// =============================================================================

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_seed_is_idempotent(pool: PgPool) {
    let first = seed::run(&pool, &seed_options(false)).await.unwrap();
    assert!(first.admin_created);
    assert_eq!(first.categories_inserted, 5);
    assert_eq!(first.products_inserted, 3);

    let second = seed::run(&pool, &seed_options(false)).await.unwrap();
    assert!(!second.admin_created);
    assert_eq!(second.categories_inserted, 0);
    assert_eq!(second.products_removed, 0);
    assert_eq!(second.products_inserted, 0);

    assert_eq!(UserRepository::new(&pool).count().await.unwrap(), 1);
    assert_eq!(CategoryRepository::new(&pool).list().await.unwrap().len(), 5);
    assert_eq!(ProductRepository::new(&pool).count().await.unwrap(), 3);

    let admin = AuthService::new(&pool)
        .login(DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
        .await
        .unwrap();
    assert_eq!(admin.role, UserRole::Admin);
    assert_eq!(admin.name, "Admin");
}

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_seed_reset_reinserts_sample_products(pool: PgPool) {
    seed::run(&pool, &seed_options(false)).await.unwrap();

    let reset = seed::run(&pool, &seed_options(true)).await.unwrap();
    assert_eq!(reset.products_removed, 3);
    assert_eq!(reset.products_inserted, 3);

    let mut names: Vec<String> = ProductRepository::new(&pool)
        .list(&Default::default())
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    names.sort();
    assert_eq!(
        names,
        ["Zapatilla Dunk Shot", "Zapatilla Runner Pro", "Zapatilla Urbana"]
    );
}

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_seed_survives_admin_emptying_the_catalog(pool: PgPool) {
    seed::run(&pool, &seed_options(false)).await.unwrap();

    let products = ProductRepository::new(&pool);
    for product in products.list(&Default::default()).await.unwrap() {
        products.delete(product.id).await.unwrap();
    }
    let categories = CategoryRepository::new(&pool);
    let running = categories
        .list()
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == "Running")
        .unwrap();
    categories.delete(running.id).await.unwrap();

    // A later boot leaves the admin's empty catalog alone.
    let reboot = seed::run(&pool, &seed_options(false)).await.unwrap();
    assert_eq!(reboot.categories_inserted, 0);
    assert_eq!(reboot.products_inserted, 0);
    assert_eq!(products.count().await.unwrap(), 0);

    // An explicit reset brings back the samples and their missing category.
    let reset = seed::run(&pool, &seed_options(true)).await.unwrap();
    assert_eq!(reset.products_inserted, 3);
    assert_eq!(products.count().await.unwrap(), 3);
    assert!(
        categories
            .list()
            .await
            .unwrap()
            .iter()
            .any(|c| c.name == "Running")
    );
}

// =============================================================================
// Cart & Checkout
// =============================================================================

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_cart_add_respects_stock(pool: PgPool) {
    let user = create_user(&pool, "ana@example.com", UserRole::Customer).await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, category, "Runner", 1000, 3).await;
    let cart = CartRepository::new(&pool);

    assert!(matches!(
        cart.add(user.id, product, 2).await.unwrap(),
        CartChange::Saved { quantity: 2 }
    ));
    assert!(matches!(
        cart.add(user.id, product, 2).await.unwrap(),
        CartChange::InsufficientStock { available: 3 }
    ));
    assert!(matches!(
        cart.add(user.id, ProductId::new(9999), 1).await.unwrap(),
        CartChange::UnknownProduct
    ));
    let lines = cart.lines(user.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines.first().map(|l| l.quantity), Some(2));
}

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_checkout_totals_decrements_stock_and_empties_cart(pool: PgPool) {
    let user = create_user(&pool, "ana@example.com", UserRole::Customer).await;
    let category = create_category(&pool).await;
    let runner = create_product(&pool, category, "Zapatilla Runner Pro", 299_000, 20).await;
    let urbana = create_product(&pool, category, "Zapatilla Urbana", 199_000, 35).await;

    let cart = CartRepository::new(&pool);
    cart.add(user.id, runner, 2).await.unwrap();
    cart.add(user.id, urbana, 1).await.unwrap();

    let order = OrderService::new(&pool).checkout(user.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total.minor_units(), 797_000);

    let detail = OrderRepository::new(&pool).get(order.id).await.unwrap().unwrap();
    assert_eq!(detail.items.len(), 2);
    let line_sum: i64 = detail
        .items
        .iter()
        .map(|item| item.subtotal().minor_units())
        .sum();
    assert_eq!(line_sum, order.total.minor_units());

    assert_eq!(stock_of(&pool, runner).await, 18);
    assert_eq!(stock_of(&pool, urbana).await, 34);
    assert!(cart.lines(user.id).await.unwrap().is_empty());
}

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_checkout_with_insufficient_stock_changes_nothing(pool: PgPool) {
    let user = create_user(&pool, "ana@example.com", UserRole::Customer).await;
    let category = create_category(&pool).await;
    let runner = create_product(&pool, category, "Zapatilla Runner Pro", 299_000, 3).await;

    let cart = CartRepository::new(&pool);
    cart.add(user.id, runner, 3).await.unwrap();

    // Someone else bought most of the stock in the meantime.
    sqlx::query("UPDATE products SET stock = 1 WHERE id = $1")
        .bind(runner)
        .execute(&pool)
        .await
        .unwrap();

    let err = OrderService::new(&pool).checkout(user.id).await.unwrap_err();
    assert!(matches!(
        err,
        OrderError::InsufficientStock { ref product_name, available: 1 }
            if product_name == "Zapatilla Runner Pro"
    ));

    assert_eq!(stock_of(&pool, runner).await, 1);
    let lines = cart.lines(user.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 3);
    assert!(OrderRepository::new(&pool).list_for_user(user.id).await.unwrap().is_empty());
}

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_checkout_with_empty_cart(pool: PgPool) {
    let user = create_user(&pool, "ana@example.com", UserRole::Customer).await;

    assert!(matches!(
        OrderService::new(&pool).checkout(user.id).await,
        Err(OrderError::EmptyCart)
    ));
}

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_deleted_product_keeps_order_snapshot(pool: PgPool) {
    let user = create_user(&pool, "ana@example.com", UserRole::Customer).await;
    let category = create_category(&pool).await;
    let runner = create_product(&pool, category, "Zapatilla Runner Pro", 299_000, 5).await;
    CartRepository::new(&pool).add(user.id, runner, 1).await.unwrap();
    let order = OrderService::new(&pool).checkout(user.id).await.unwrap();

    ProductRepository::new(&pool).delete(runner).await.unwrap();

    let detail = OrderRepository::new(&pool).get(order.id).await.unwrap().unwrap();
    assert_eq!(detail.items[0].product_id, None);
    assert_eq!(detail.items[0].product_name, "Zapatilla Runner Pro");
    assert_eq!(detail.items[0].unit_price.minor_units(), 299_000);
}

// =============================================================================
// Order Status
// =============================================================================

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_cancel_restores_stock(pool: PgPool) {
    let user = create_user(&pool, "ana@example.com", UserRole::Customer).await;
    let category = create_category(&pool).await;
    let runner = create_product(&pool, category, "Zapatilla Runner Pro", 299_000, 20).await;
    CartRepository::new(&pool).add(user.id, runner, 2).await.unwrap();

    let orders = OrderService::new(&pool);
    let order = orders.checkout(user.id).await.unwrap();
    assert_eq!(stock_of(&pool, runner).await, 18);

    let cancelled = orders.cancel_own(user.id, order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&pool, runner).await, 20);

    // A second cancel is rejected and does not restock twice.
    assert!(matches!(
        orders.cancel_own(user.id, order.id).await,
        Err(OrderError::InvalidTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Cancelled
        })
    ));
    assert_eq!(stock_of(&pool, runner).await, 20);
}

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_status_transitions(pool: PgPool) {
    let user = create_user(&pool, "ana@example.com", UserRole::Customer).await;
    let other = create_user(&pool, "otro@example.com", UserRole::Customer).await;
    let category = create_category(&pool).await;
    let runner = create_product(&pool, category, "Zapatilla Runner Pro", 299_000, 20).await;
    CartRepository::new(&pool).add(user.id, runner, 1).await.unwrap();

    let orders = OrderService::new(&pool);
    let order = orders.checkout(user.id).await.unwrap();

    assert!(matches!(
        orders.set_status(order.id, OrderStatus::Delivered).await,
        Err(OrderError::InvalidTransition { .. })
    ));
    assert!(matches!(
        orders.cancel_own(other.id, order.id).await,
        Err(OrderError::NotFound)
    ));

    orders.set_status(order.id, OrderStatus::Paid).await.unwrap();
    // Shoppers may only cancel pending orders.
    assert!(matches!(
        orders.cancel_own(user.id, order.id).await,
        Err(OrderError::InvalidTransition { from: OrderStatus::Paid, .. })
    ));

    orders.set_status(order.id, OrderStatus::Shipped).await.unwrap();
    assert!(matches!(
        orders.set_status(order.id, OrderStatus::Cancelled).await,
        Err(OrderError::InvalidTransition {
            from: OrderStatus::Shipped,
            to: OrderStatus::Cancelled
        })
    ));

    let delivered = orders.set_status(order.id, OrderStatus::Delivered).await.unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert_eq!(stock_of(&pool, runner).await, 19);

    let stats = OrderRepository::new(&pool).stats().await.unwrap();
    assert_eq!(stats.orders, 1);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.revenue.minor_units(), 299_000);
}

// =============================================================================
// Logged-in Router Flows
// =============================================================================

async fn login(app: &axum::Router, email: &str, next: &str) -> String {
    let response = send(
        app,
        post_form(
            "/auth/login",
            &[("email", email), ("password", "secreta123"), ("next", next)],
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some(next));
    session_cookie(&response).expect("login sets the session cookie")
}

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_customer_cannot_reach_admin(pool: PgPool) {
    create_user(&pool, "ana@example.com", UserRole::Customer).await;
    let app = test_app(pool);

    let cookie = login(&app, "ana@example.com", "/cart").await;

    let cart = send(&app, get("/cart", Some(&cookie))).await;
    assert_eq!(cart.status(), StatusCode::OK);

    let admin = send(&app, get("/admin", Some(&cookie))).await;
    assert_eq!(admin.status(), StatusCode::FORBIDDEN);

    // The error page keeps the logged-in navigation.
    let body = body_text(admin).await;
    assert!(body.contains("Acceso denegado"));
    assert!(body.contains("Cliente"));
    assert!(body.contains("/auth/logout"));
    assert!(!body.contains("/auth/register"));
}

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_not_found_page_keeps_logged_in_navigation(pool: PgPool) {
    create_user(&pool, "ana@example.com", UserRole::Customer).await;
    let app = test_app(pool);
    let cookie = login(&app, "ana@example.com", "/").await;

    let response = send(&app, get("/products/abc", Some(&cookie))).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_text(response).await;
    assert!(body.contains("Página no encontrada"));
    assert!(body.contains("/auth/logout"));
}

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_login_keeps_flash_queued_by_logout(pool: PgPool) {
    create_user(&pool, "ana@example.com", UserRole::Customer).await;
    let app = test_app(pool);
    let cookie = login(&app, "ana@example.com", "/cart").await;

    let logout = send(&app, get("/auth/logout", Some(&cookie))).await;
    assert_eq!(location(&logout), Some("/"));
    let cookie = session_cookie(&logout).expect("logout cycles the session");

    let relogin = send(
        &app,
        post_form(
            "/auth/login",
            &[("email", "ana@example.com"), ("password", "secreta123")],
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(relogin.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&relogin).expect("login cycles the session");

    let body = body_text(send(&app, get("/", Some(&cookie))).await).await;
    assert!(body.contains("Sesión cerrada."));
    assert!(body.contains("Bienvenido, Cliente!"));
}

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_admin_product_create_keeps_earlier_flash(pool: PgPool) {
    create_user(&pool, "jefa@example.com", UserRole::Admin).await;
    let category = create_category(&pool).await.to_string();
    let app = test_app(pool);
    let cookie = login(&app, "jefa@example.com", "/admin/products").await;

    let created = send(
        &app,
        post_form(
            "/admin/products/new",
            &[
                ("name", "Runner"),
                ("description", ""),
                ("price", "1000"),
                ("stock", "3"),
                ("category_id", &category),
                ("image_url", ""),
            ],
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(created.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&created), Some("/admin/products"));

    let body = body_text(send(&app, get("/admin/products", Some(&cookie))).await).await;
    assert!(body.contains("Bienvenido, Cliente!"));
    assert!(body.contains("creado"));
}

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_admin_reaches_dashboard(pool: PgPool) {
    create_user(&pool, "jefa@example.com", UserRole::Admin).await;
    let app = test_app(pool);

    let cookie = login(&app, "jefa@example.com", "/admin").await;

    let dashboard = send(&app, get("/admin", Some(&cookie))).await;
    assert_eq!(dashboard.status(), StatusCode::OK);
}

#[sqlx::test(migrator = "tienda_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_unsafe_next_falls_back_to_catalog(pool: PgPool) {
    create_user(&pool, "ana@example.com", UserRole::Customer).await;
    let app = test_app(pool);

    let response = send(
        &app,
        post_form(
            "/auth/login",
            &[
                ("email", "ana@example.com"),
                ("password", "secreta123"),
                ("next", "//evil.example.com"),
            ],
            None,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));
}
