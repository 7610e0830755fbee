use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Liveness check. Does not touch SMTP or the output directory.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "alive" }))
}
