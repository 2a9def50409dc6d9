//! Router-level tests for the storefront.
//!
//! Vault is mocked with `wiremock`; no database is required. Where a
//! connection would be opened, the target port has nothing listening.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::http::StatusCode;
use wiremock::MockServer;

use book_haven_integration_tests::{
    TEST_SECRET_PATH, TEST_VAULT_TOKEN, TestDatabase, as_pairs, get, mount_credentials,
    mount_denied, post_form, send, test_app, valid_order, vault_requests,
};

// ============================================================================
// Probes
// ============================================================================

#[tokio::test]
async fn test_health_is_ok_without_dependencies() {
    let vault = MockServer::start().await;
    let app = test_app(&vault, &TestDatabase::unreachable());

    let response = send(&app, get("/health")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
    assert_eq!(vault_requests(&vault).await, 0);
}

#[tokio::test]
async fn test_readiness_fails_when_vault_denies() {
    let vault = MockServer::start().await;
    mount_denied(&vault).await;
    let app = test_app(&vault, &TestDatabase::unreachable());

    let response = send(&app, get("/health/ready")).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_readiness_fails_when_database_unreachable() {
    let vault = MockServer::start().await;
    mount_credentials(&vault, "v-ready-user", "v-ready-pass").await;
    let app = test_app(&vault, &TestDatabase::unreachable());

    let response = send(&app, get("/health/ready")).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(vault_requests(&vault).await, 1);
}

// ============================================================================
// Home page
// ============================================================================

#[tokio::test]
async fn test_home_secret_unavailable_is_error_page() {
    let vault = MockServer::start().await;
    mount_denied(&vault).await;
    let app = test_app(&vault, &TestDatabase::unreachable());

    let response = send(&app, get("/")).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.body.contains("Something went wrong on our end"));
    assert!(!response.body.contains("data-book-id"));
    assert!(!response.body.contains(TEST_VAULT_TOKEN));
    assert!(!response.body.contains(TEST_SECRET_PATH));
}

#[tokio::test]
async fn test_home_database_unreachable_hides_credentials() {
    let vault = MockServer::start().await;
    mount_credentials(&vault, "v-leaky-user", "v-leaky-pass").await;
    let app = test_app(&vault, &TestDatabase::unreachable());

    let response = send(&app, get("/")).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!response.body.contains("v-leaky-user"));
    assert!(!response.body.contains("v-leaky-pass"));
    assert!(!response.body.contains("127.0.0.1"));
}

#[tokio::test]
async fn test_each_request_fetches_a_fresh_credential() {
    let vault = MockServer::start().await;
    mount_credentials(&vault, "v-user", "v-pass").await;
    let app = test_app(&vault, &TestDatabase::unreachable());

    send(&app, get("/")).await;
    send(&app, get("/")).await;

    assert_eq!(vault_requests(&vault).await, 2);
}

// ============================================================================
// Purchase flow: path handling
// ============================================================================

#[tokio::test]
async fn test_order_form_renders() {
    let vault = MockServer::start().await;
    let app = test_app(&vault, &TestDatabase::unreachable());

    let response = send(&app, get("/buy/3")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"action="/buy/3""#));
    assert!(response.body.contains(r#"name="quantity""#));
    assert_eq!(vault_requests(&vault).await, 0);
}

#[tokio::test]
async fn test_malformed_book_id_is_not_found() {
    let vault = MockServer::start().await;
    let app = test_app(&vault, &TestDatabase::unreachable());

    let malformed = [
        "/buy/abc",
        "/buy/0",
        "/buy/-1",
        "/buy/1.5",
        "/buy/99999999999",
        // Percent-encoded bytes that are not UTF-8
        "/buy/%FF",
        "/buy/%C3%28",
    ];
    for uri in malformed {
        let response = send(&app, get(uri)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "GET {uri}");

        let fields = valid_order("1");
        let response = send(&app, post_form(uri, &as_pairs(&fields))).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "POST {uri}");
    }

    assert_eq!(vault_requests(&vault).await, 0);
}

#[tokio::test]
async fn test_unknown_route_is_not_found_page() {
    let vault = MockServer::start().await;
    let app = test_app(&vault, &TestDatabase::unreachable());

    let response = send(&app, get("/checkout")).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.contains("does not exist"));
}

// ============================================================================
// Purchase flow: validation happens before any credential fetch
// ============================================================================

async fn assert_rejected(fields: &[(&'static str, String)], expected_message: &str) {
    let vault = MockServer::start().await;
    mount_credentials(&vault, "v-user", "v-pass").await;
    let app = test_app(&vault, &TestDatabase::unreachable());

    let response = send(&app, post_form("/buy/1", &as_pairs(fields))).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response.body.contains(expected_message),
        "expected {expected_message:?} in failure page"
    );
    assert!(response.body.contains(r#"href="/buy/1""#));
    assert_eq!(vault_requests(&vault).await, 0);
}

#[tokio::test]
async fn test_quantity_zero_is_rejected() {
    assert_rejected(&valid_order("0"), "Quantity must be at least 1.").await;
}

#[tokio::test]
async fn test_quantity_not_a_number_is_rejected() {
    assert_rejected(&valid_order("abc"), "Quantity must be a whole number.").await;
}

#[tokio::test]
async fn test_missing_address_is_rejected() {
    let fields: Vec<_> = valid_order("1")
        .into_iter()
        .filter(|(key, _)| *key != "address")
        .collect();
    assert_rejected(&fields, "Please provide a shipping address.").await;
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let mut fields = valid_order("1");
    if let Some((_, name)) = fields.iter_mut().find(|(key, _)| *key == "name") {
        *name = "   ".to_string();
    }
    assert_rejected(&fields, "Please provide your name.").await;
}

// ============================================================================
// Purchase flow: infrastructure failures
// ============================================================================

#[tokio::test]
async fn test_order_secret_unavailable_is_generic_failure() {
    let vault = MockServer::start().await;
    mount_denied(&vault).await;
    let app = test_app(&vault, &TestDatabase::unreachable());

    let fields = valid_order("2");
    let response = send(&app, post_form("/buy/1", &as_pairs(&fields))).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Your order was not placed"));
    assert!(response.body.contains("Please try again later."));
    assert!(!response.body.contains(TEST_VAULT_TOKEN));
    assert!(!response.body.contains(TEST_SECRET_PATH));
    assert!(!response.body.contains("permission denied"));
    assert_eq!(vault_requests(&vault).await, 1);
}

#[tokio::test]
async fn test_order_database_unreachable_hides_credentials() {
    let vault = MockServer::start().await;
    mount_credentials(&vault, "v-order-user", "v-order-pass").await;
    let app = test_app(&vault, &TestDatabase::unreachable());

    let fields = valid_order("1");
    let response = send(&app, post_form("/buy/1", &as_pairs(&fields))).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Your order was not placed"));
    assert!(!response.body.contains("v-order-user"));
    assert!(!response.body.contains("v-order-pass"));
}

// ============================================================================
// Middleware
// ============================================================================

#[tokio::test]
async fn test_security_headers_present() {
    let vault = MockServer::start().await;
    let app = test_app(&vault, &TestDatabase::unreachable());

    let response = send(&app, get("/buy/2")).await;

    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    let csp = response.headers["content-security-policy"].to_str().unwrap();
    assert!(csp.contains("https://cdn.tailwindcss.com"));
    assert!(csp.contains("frame-ancestors 'none'"));
}

#[tokio::test]
async fn test_request_id_generated_and_echoed() {
    let vault = MockServer::start().await;
    let app = test_app(&vault, &TestDatabase::unreachable());

    let generated = send(&app, get("/health")).await;
    let id = generated.headers["x-request-id"].to_str().unwrap();
    assert_eq!(id.len(), 36);

    let request = axum::http::Request::builder()
        .uri("/health")
        .header("x-request-id", "edge-7f3a")
        .body(axum::body::Body::empty())
        .unwrap();
    let echoed = send(&app, request).await;
    assert_eq!(echoed.headers["x-request-id"], "edge-7f3a");
}
