//! Integration test support for Book Haven.
//!
//! # Running Tests
//!
//! ```bash
//! # Router-level tests (Vault mocked, no database needed)
//! cargo test -p book-haven-integration-tests
//!
//! # Including tests against a live PostgreSQL with migrations applied
//! cargo test -p book-haven-integration-tests -- --include-ignored
//! ```
//!
//! # Environment Variables (database tests only)
//!
//! - `BOOK_HAVEN_TEST_DB_HOST` (default `127.0.0.1`)
//! - `BOOK_HAVEN_TEST_DB_PORT` (default `5432`)
//! - `BOOK_HAVEN_TEST_DB_NAME` (default `bookhaven_test`)
//! - `BOOK_HAVEN_TEST_DB_USER` (default `postgres`)
//! - `BOOK_HAVEN_TEST_DB_PASSWORD` (default `postgres`)
//!
//! The mocked Vault hands out the `BOOK_HAVEN_TEST_DB_USER` credential, so
//! the storefront connects exactly as it would in production.

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header::CONTENT_TYPE},
};
use secrecy::SecretString;
use serde_json::json;
use sqlx::{Connection, PgConnection, postgres::PgConnectOptions};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use book_haven_storefront::config::{DatabaseConfig, StorefrontConfig, VaultConfig};
use book_haven_storefront::services::SecretPath;
use book_haven_storefront::state::AppState;

/// Vault token used by every test configuration.
pub const TEST_VAULT_TOKEN: &str = "s.integration-test-token-3b7f";

/// Secret path the storefront reads credentials from.
pub const TEST_SECRET_PATH: &str = "database/creds/bookstore";

/// Vault URL path for [`TEST_SECRET_PATH`].
pub const VAULT_CREDS_PATH: &str = "/v1/database/creds/bookstore";

/// Database settings for tests, from `BOOK_HAVEN_TEST_DB_*`.
#[derive(Debug, Clone)]
pub struct TestDatabase {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub username: String,
    pub password: String,
}

impl TestDatabase {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            host: env_or("BOOK_HAVEN_TEST_DB_HOST", "127.0.0.1"),
            port: env_or("BOOK_HAVEN_TEST_DB_PORT", "5432")
                .parse()
                .expect("BOOK_HAVEN_TEST_DB_PORT must be a port number"),
            dbname: env_or("BOOK_HAVEN_TEST_DB_NAME", "bookhaven_test"),
            username: env_or("BOOK_HAVEN_TEST_DB_USER", "postgres"),
            password: env_or("BOOK_HAVEN_TEST_DB_PASSWORD", "postgres"),
        }
    }

    /// A database nobody listens on.
    #[must_use]
    pub fn unreachable() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 1,
            dbname: "bookhaven_test".to_string(),
            username: "nobody".to_string(),
            password: "unused".to_string(),
        }
    }

    /// Open a direct connection for fixtures and assertions.
    pub async fn connect(&self) -> PgConnection {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.dbname)
            .username(&self.username)
            .password(&self.password);
        PgConnection::connect_with(&options)
            .await
            .expect("Failed to connect to test database")
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Build a storefront configuration pointing at a mock Vault.
#[must_use]
pub fn test_config(vault: &MockServer, database: &TestDatabase) -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        vault: VaultConfig {
            address: vault.uri().parse().expect("mock server URI is a URL"),
            token: SecretString::from(TEST_VAULT_TOKEN),
            namespace: None,
            secret_path: SecretPath::new(TEST_SECRET_PATH).expect("valid secret path"),
            request_timeout: Duration::from_secs(2),
        },
        database: DatabaseConfig {
            host: database.host.clone(),
            port: database.port,
            dbname: database.dbname.clone(),
            connect_timeout: Duration::from_secs(2),
            statement_timeout: Duration::from_secs(5),
        },
        featured_limit: 3,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Build the full application router.
pub fn test_app(vault: &MockServer, database: &TestDatabase) -> Router {
    let state =
        AppState::new(test_config(vault, database)).expect("Failed to build application state");
    book_haven_storefront::app(state)
}

/// Make the mock Vault issue the given credential on every read.
pub async fn mount_credentials(vault: &MockServer, username: &str, password: &str) {
    Mock::given(method("GET"))
        .and(path(VAULT_CREDS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lease_id": "database/creds/bookstore/test-lease",
            "lease_duration": 300,
            "renewable": true,
            "data": { "username": username, "password": password }
        })))
        .mount(vault)
        .await;
}

/// Make the mock Vault reject the token.
pub async fn mount_denied(vault: &MockServer) {
    Mock::given(method("GET"))
        .and(path(VAULT_CREDS_PATH))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "errors": ["permission denied"] })),
        )
        .mount(vault)
        .await;
}

/// Number of requests the mock Vault has received.
pub async fn vault_requests(vault: &MockServer) -> usize {
    vault
        .received_requests()
        .await
        .map_or(0, |requests| requests.len())
}

/// Response status, headers and body text.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// Send a request through the router.
pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).expect("body is UTF-8"),
    }
}

/// `GET` request.
#[must_use]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

/// Form-encoded `POST` request.
#[must_use]
pub fn post_form(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("valid request")
}

/// A complete, valid order submission.
#[must_use]
pub fn valid_order(quantity: &str) -> Vec<(&'static str, String)> {
    vec![
        ("name", "Ada Lovelace".to_string()),
        ("email", "ada@example.com".to_string()),
        ("phone", "555-0100".to_string()),
        ("address", "12 Analytical Row, London".to_string()),
        ("quantity", quantity.to_string()),
    ]
}

/// Borrow [`valid_order`] output as the pairs [`post_form`] takes.
#[must_use]
pub fn as_pairs<'a>(fields: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
    fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
}
