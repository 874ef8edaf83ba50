use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe for load balancers and orchestrators.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "OK" }))
}
