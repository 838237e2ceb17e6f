//! Router tests for pages and guards that do not need a database.
//!
//! The app runs over in-memory sessions and a pool that never connects, so
//! each test exercises the full middleware stack without `PostgreSQL`.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};

use tienda_integration_tests::{body_text, get, lazy_pool, location, post_form, send, test_app};

// =============================================================================
// Health & Middleware
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = test_app(lazy_pool());

    let response = send(&app, get("/health", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = test_app(lazy_pool());

    let response = send(&app, get("/health", None)).await;
    let headers = response.headers();

    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store, max-age=0");
    assert!(!headers.get("x-request-id").unwrap().is_empty());
}

#[tokio::test]
async fn test_upstream_request_id_is_echoed() {
    let app = test_app(lazy_pool());
    let request = axum::http::Request::get("/health")
        .header("x-request-id", "edge-42")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = send(&app, request).await;

    assert_eq!(response.headers().get("x-request-id").unwrap(), "edge-42");
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let app = test_app(lazy_pool());

    let response = send(&app, get("/static/css/main.css", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/css"));
    assert!(!response.headers().contains_key(header::CACHE_CONTROL));
}

#[tokio::test]
async fn test_unknown_route_renders_not_found_page() {
    let app = test_app(lazy_pool());

    let response = send(&app, get("/no-such-page", None)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_text(response).await;
    assert!(body.contains("Página no encontrada"));
}

#[tokio::test]
async fn test_unparsable_path_id_renders_not_found_page() {
    let app = test_app(lazy_pool());

    let response = send(&app, get("/products/abc", None)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/html"));
    let body = body_text(response).await;
    assert!(body.contains("Página no encontrada"));
    assert!(!body.contains("Cannot parse"));
}

#[tokio::test]
async fn test_malformed_form_renders_bad_request_page() {
    let app = test_app(lazy_pool());
    let request = Request::post("/auth/login")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("email=ana@example.com"))
        .unwrap();

    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_text(response).await;
    assert!(body.contains("Solicitud inválida"));
    assert!(!body.contains("Content-Type"));
}

// =============================================================================
// Auth Pages
// =============================================================================

#[tokio::test]
async fn test_login_page_renders() {
    let app = test_app(lazy_pool());

    let response = send(&app, get("/auth/login?next=/cart", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"action="/auth/login""#));
    assert!(body.contains(r#"name="next""#));
    assert!(body.contains("Registrarse"));
}

#[tokio::test]
async fn test_anonymous_page_view_sets_no_cookie() {
    let app = test_app(lazy_pool());

    let response = send(&app, get("/auth/register", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key(header::SET_COOKIE));
}

#[tokio::test]
async fn test_register_with_missing_fields_rerenders_form() {
    let app = test_app(lazy_pool());

    let response = send(
        &app,
        post_form(
            "/auth/register",
            &[("name", "  "), ("email", "ana@example.com"), ("password", "")],
            None,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Completa todos los campos"));
    assert!(body.contains(r#"value="ana@example.com""#));
}

#[tokio::test]
async fn test_register_with_invalid_email_rerenders_form() {
    let app = test_app(lazy_pool());

    let response = send(
        &app,
        post_form(
            "/auth/register",
            &[("name", "Ana"), ("email", "not-an-email"), ("password", "secreta")],
            None,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Correo electrónico inválido"));
}

// =============================================================================
// Guards
// =============================================================================

#[tokio::test]
async fn test_protected_pages_redirect_to_login_with_next() {
    let app = test_app(lazy_pool());

    let cases = [
        ("/cart", "/auth/login?next=%2Fcart"),
        ("/orders", "/auth/login?next=%2Forders"),
        ("/orders/7", "/auth/login?next=%2Forders%2F7"),
        ("/auth/profile", "/auth/login?next=%2Fauth%2Fprofile"),
        ("/admin", "/auth/login?next=%2Fadmin"),
        (
            "/admin/orders?status=paid",
            "/auth/login?next=%2Fadmin%2Forders%3Fstatus%3Dpaid",
        ),
    ];

    for (path, expected) in cases {
        let response = send(&app, get(path, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), Some(expected), "{path}");
    }
}

#[tokio::test]
async fn test_anonymous_form_posts_redirect_to_plain_login() {
    let app = test_app(lazy_pool());

    let cases = [
        ("/cart/add", vec![("product_id", "1"), ("quantity", "1")]),
        ("/orders/checkout", vec![]),
        ("/admin/categories", vec![("name", "Trail")]),
        ("/admin/users/1/role", vec![("role", "admin")]),
    ];

    for (path, fields) in cases {
        let response = send(&app, post_form(path, &fields, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), Some("/auth/login"), "{path}");
    }
}
