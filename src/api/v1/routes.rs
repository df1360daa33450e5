/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /login, /me
 * - credential 検証は filter chain 側 (全 route に適用)。匿名を拒否するかは handler の extractor で決める
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    health::health,
    session::{login, me},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/login", post(login))
        .route("/me", get(me))
}
