use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use wedding_core::types::Timestamp;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub database: &'static str,
    pub timestamp: Timestamp,
}

/// GET /api/health -- 200 when the database answers, 503 otherwise.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = wedding_db::health_check(&state.pool).await.is_ok();

    let (status, message) = if db_healthy {
        (StatusCode::OK, "Wedding API is running")
    } else {
        tracing::warn!("Health check could not reach the database");
        (StatusCode::SERVICE_UNAVAILABLE, "Database unavailable")
    };

    (
        status,
        Json(HealthResponse {
            success: db_healthy,
            message,
            version: env!("CARGO_PKG_VERSION"),
            database: "SQLite",
            timestamp: Utc::now(),
        }),
    )
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
