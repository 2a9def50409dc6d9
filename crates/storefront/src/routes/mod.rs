//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (featured books)
//! GET  /buy/{book_id}          - Order form
//! POST /buy/{book_id}          - Place order
//!
//! # Probes
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (Vault + PostgreSQL)
//! ```

pub mod buy;
pub mod health;
pub mod home;

use axum::{Router, routing::get};

use crate::error::AppError;
use crate::state::AppState;

/// Create the storefront page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/buy/{book_id}", get(buy::form).post(buy::submit))
}

/// Create the probe routes.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Fallback for unmatched paths.
pub async fn not_found() -> AppError {
    AppError::NotFound("no route".to_string())
}
