/*
 * Responsibility
 * - GET /health (疎通用)
 * - 認証不要 (匿名でも 200)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
