//! Live-server tests against a running storefront.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - The storefront running with bootstrap enabled (cargo run -p tienda-storefront)
//!
//! Run with: `cargo test -p tienda-integration-tests -- --ignored live`

#![allow(clippy::expect_used)]

use reqwest::{Client, StatusCode, redirect::Policy};

/// Base URL for the storefront (configurable via environment).
fn base_url() -> String {
    std::env::var("STOREFRONT_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A client that keeps cookies and does not follow redirects.
fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_live_readiness() {
    let resp = client()
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .expect("Failed to reach storefront");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.expect("readiness body is JSON");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_live_catalog_lists_seeded_products() {
    let resp = client()
        .get(format!("{}/?q=zapatilla", base_url()))
        .send()
        .await
        .expect("Failed to get catalog");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("Zapatilla Runner Pro"));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_live_seeded_admin_login() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[
            ("email", "admin@tienda.com"),
            ("password", "admin123"),
            ("next", "/admin"),
        ])
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get("location").and_then(|v| v.to_str().ok()),
        Some("/admin")
    );

    let resp = client
        .get(format!("{base_url}/admin"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/auth/logout"))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = client
        .get(format!("{base_url}/admin"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}
