use axum::Json;
use axum::extract::State;
use serde_json::{Map, Value};

use crate::api::v1::dto::login::{LoginRequest, LoginResponse};
use crate::api::v1::extractors::AuthCtxExtractor;
use crate::error::AppError;
use crate::services::axsrf::IssuerHandle;
use crate::state::AppState;

/// POST /login
///
/// Issues a credential bound to a fresh `axsrf` cookie. The cookie leaves via
/// `Set-Cookie`; only the token is in the body. Password checks are the
/// application's business and are not part of this demo.
pub async fn login(
    State(state): State<AppState>,
    issuer: IssuerHandle,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if req.sub.trim().is_empty() {
        return Err(AppError::InvalidRequest("sub must not be empty".to_string()));
    }

    let settings = state.login;
    let sub = req.sub.clone();
    let token = issuer.issue(&req.into_payload(), settings.token_ttl, settings.cookie_secure)?;

    tracing::info!(sub = %sub, "issued credential");

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: settings.token_ttl.as_secs(),
    }))
}

/// GET /me
///
/// Verified claims of the caller, 401 when anonymous.
pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<Map<String, Value>> {
    Json(ctx.identity.into_claims())
}
