//! Liveness and readiness probes.

use axum::extract::State;
use axum::http::StatusCode;

use crate::db::ConnectionFactory;
use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Runs the full connection path a request would: credential fetch, connect,
/// `SELECT 1`. Returns 503 Service Unavailable if any step fails.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let mut conn = match state.connections().open_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            return StatusCode::SERVICE_UNAVAILABLE;
        }
    };

    let probe = sqlx::query("SELECT 1").execute(&mut conn).await;
    ConnectionFactory::release(conn).await;

    match probe {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness query failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
