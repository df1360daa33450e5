use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::axsrf::IssuerHandle;

/// filter chain が配置した IssuerHandle を取り出す
/// 見つからない場合は配線ミスなので 500
impl<S> FromRequestParts<S> for IssuerHandle
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<IssuerHandle>().cloned().ok_or_else(|| {
            tracing::error!("IssuerHandle missing: filter chain is not applied to this route");
            AppError::Internal
        })
    }
}
