use axum::{extract::State, Json};
use serde_json::{json, Value};
use service_core::error::AppError;

use crate::AppState;

/// Liveness probe for the browser client.
pub async fn api_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness: fails with 503 while the store is unreachable.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.repo.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Store health check failed");
        AppError::ServiceUnavailable
    })?;

    Ok(Json(json!({
        "status": "ok",
        "service": state.config.service_name,
        "version": state.config.service_version,
    })))
}
