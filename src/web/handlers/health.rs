//! Health check handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::warn;

use crate::web::{responses::ApiResponse, AppState};

/// Liveness with a database round trip
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.database.pool())
        .await
    {
        Ok(_) => "connected",
        Err(e) => {
            warn!("Health check database probe failed: {}", e);
            "disconnected"
        }
    };

    let healthy = database == "connected";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(json!({
            "status": if healthy { "healthy" } else { "unhealthy" },
            "version": env!("CARGO_PKG_VERSION"),
            "database": database,
        }))),
    )
}
