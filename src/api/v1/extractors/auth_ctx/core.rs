use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::axsrf::Authentication;

use super::AuthCtx;

/// Handler で、 AuthCtx を受け取るための extractor
/// middleware が Authentication を request.extensions() に insert 済みである前提
/// 匿名・未設定の場合は 401 を返す
pub struct AuthCtxExtractor(pub AuthCtx);

impl<S> FromRequestParts<S> for AuthCtxExtractor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        auth_ctx(parts)
            .map(AuthCtxExtractor)
            .ok_or(AppError::Unauthorized)
    }
}

/// 匿名アクセスを許す route 用
pub struct MaybeAuthCtx(pub Option<AuthCtx>);

impl<S> FromRequestParts<S> for MaybeAuthCtx
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthCtx(auth_ctx(parts)))
    }
}

fn auth_ctx(parts: &Parts) -> Option<AuthCtx> {
    parts
        .extensions
        .get::<Authentication>()
        .and_then(Authentication::identity)
        .cloned()
        .map(AuthCtx::new)
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use serde_json::json;

    use super::*;
    use crate::services::axsrf::{AnonymousReason, Identity};

    fn parts_with(authentication: Option<Authentication>) -> Parts {
        let (mut parts, _) = Request::new(()).into_parts();
        if let Some(authentication) = authentication {
            parts.extensions.insert(authentication);
        }
        parts
    }

    fn authenticated() -> Authentication {
        match json!({"sub": "user-1"}) {
            serde_json::Value::Object(map) => Authentication::Authenticated(Identity::new(map)),
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn extractor_yields_identity() {
        let mut parts = parts_with(Some(authenticated()));
        let AuthCtxExtractor(ctx) = AuthCtxExtractor::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(ctx.subject(), Some("user-1"));
    }

    #[tokio::test]
    async fn extractor_rejects_anonymous_and_missing() {
        let mut anonymous = parts_with(Some(Authentication::Anonymous(AnonymousReason::Expired)));
        assert!(matches!(
            AuthCtxExtractor::from_request_parts(&mut anonymous, &()).await,
            Err(AppError::Unauthorized)
        ));

        let mut missing = parts_with(None);
        assert!(matches!(
            AuthCtxExtractor::from_request_parts(&mut missing, &()).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn optional_extractor_never_rejects() {
        let mut anonymous = parts_with(Some(Authentication::Anonymous(AnonymousReason::NoCredential)));
        let Ok(MaybeAuthCtx(ctx)) = MaybeAuthCtx::from_request_parts(&mut anonymous, &()).await;
        assert!(ctx.is_none());

        let mut parts = parts_with(Some(authenticated()));
        let Ok(MaybeAuthCtx(ctx)) = MaybeAuthCtx::from_request_parts(&mut parts, &()).await;
        assert_eq!(ctx.unwrap().subject(), Some("user-1"));
    }
}
