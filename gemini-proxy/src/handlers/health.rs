use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness only: never touches the upstream or the credential.
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "OK" })))
}
