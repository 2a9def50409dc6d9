//! End-to-end tests against a live `PostgreSQL`.
//!
//! These tests require:
//! - A running `PostgreSQL` reachable with `BOOK_HAVEN_TEST_DB_*`
//! - Migrations applied (`bh-cli migrate`)
//!
//! Vault is still mocked; it hands out the test database credential.
//!
//! Run with: cargo test -p book-haven-integration-tests -- --include-ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::http::StatusCode;
use sqlx::PgConnection;
use wiremock::MockServer;

use book_haven_integration_tests::{
    TestDatabase, as_pairs, get, mount_credentials, post_form, send, test_app, valid_order,
    vault_requests,
};

/// Insert a book and return its id.
async fn insert_book(conn: &mut PgConnection, title: &str) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO books (title, author, price, image_url) \
         VALUES ($1, 'Test Author', 9.99, 'https://covers.example.com/test.jpg') \
         RETURNING id",
    )
    .bind(title)
    .fetch_one(conn)
    .await
    .expect("Failed to insert test book")
}

async fn orders_for(conn: &mut PgConnection, book_id: i32) -> Vec<(i32, i32)> {
    sqlx::query_as("SELECT id, quantity FROM customers WHERE book_id = $1 ORDER BY id")
        .bind(book_id)
        .fetch_all(conn)
        .await
        .expect("Failed to query orders")
}

async fn setup() -> (MockServer, TestDatabase, PgConnection) {
    let db = TestDatabase::from_env();
    let vault = MockServer::start().await;
    mount_credentials(&vault, &db.username, &db.password).await;
    let conn = db.connect().await;
    (vault, db, conn)
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_home_renders_at_most_limit_cards() {
    let (vault, db, mut conn) = setup().await;
    for n in 0..4 {
        insert_book(&mut conn, &format!("Home Fixture {n}")).await;
    }
    let app = test_app(&vault, &db);

    let response = send(&app, get("/")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.matches("data-book-id=").count(), 3);
    assert_eq!(response.body.matches(r#"href="/buy/"#).count(), 3);
    assert_eq!(vault_requests(&vault).await, 1);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_valid_order_inserts_one_row() {
    let (vault, db, mut conn) = setup().await;
    let book_id = insert_book(&mut conn, "Order Fixture").await;
    let app = test_app(&vault, &db);

    let fields = valid_order("2");
    let response = send(&app, post_form(&format!("/buy/{book_id}"), &as_pairs(&fields))).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Thank you, Ada Lovelace!"));

    let rows = orders_for(&mut conn, book_id).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].1, 2);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_invalid_quantity_inserts_nothing() {
    let (vault, db, mut conn) = setup().await;
    let book_id = insert_book(&mut conn, "Rejected Fixture").await;
    let app = test_app(&vault, &db);

    for quantity in ["0", "abc", "-3"] {
        let fields = valid_order(quantity);
        let response =
            send(&app, post_form(&format!("/buy/{book_id}"), &as_pairs(&fields))).await;
        assert!(response.body.contains("Your order was not placed"));
    }

    assert!(orders_for(&mut conn, book_id).await.is_empty());
    assert_eq!(vault_requests(&vault).await, 0);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_unknown_book_is_rejected() {
    let (vault, db, _conn) = setup().await;
    let app = test_app(&vault, &db);

    let fields = valid_order("1");
    let response = send(&app, post_form("/buy/2147483647", &as_pairs(&fields))).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Sorry, that book is not available."));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_concurrent_orders_insert_distinct_rows() {
    let (vault, db, mut conn) = setup().await;
    let book_id = insert_book(&mut conn, "Concurrent Fixture").await;
    let app = test_app(&vault, &db);
    let uri = format!("/buy/{book_id}");

    let first = valid_order("1");
    let second = valid_order("3");
    let (a, b) = tokio::join!(
        send(&app, post_form(&uri, &as_pairs(&first))),
        send(&app, post_form(&uri, &as_pairs(&second))),
    );

    assert!(a.body.contains("Thank you"));
    assert!(b.body.contains("Thank you"));

    let rows = orders_for(&mut conn, book_id).await;
    assert_eq!(rows.len(), 2);
    assert_ne!(rows[0].0, rows[1].0);
    let mut quantities: Vec<i32> = rows.iter().map(|(_, q)| *q).collect();
    quantities.sort_unstable();
    assert_eq!(quantities, vec![1, 3]);
    assert_eq!(vault_requests(&vault).await, 2);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_readiness_ok_with_database() {
    let (vault, db, _conn) = setup().await;
    let app = test_app(&vault, &db);

    let response = send(&app, get("/health/ready")).await;

    assert_eq!(response.status, StatusCode::OK);
}
