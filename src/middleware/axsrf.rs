//! credential 検証 → identify 呼び出し → IssuerHandle を extensions に入れる
//!
//! - `Authorization: Bearer <token>` (or `?token=`) と `axsrf` cookie を検証する。
//! - 検証失敗は匿名扱い。ここでは拒否しない (拒否するかは identify hook 次第)。
//! - `Authentication` は request extensions に格納し、extractor から参照する。
//! - `IssuerHandle` が未配置なら配置し、handler が発行した cookie を response に書く。

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, header},
    middleware::{self, Next},
    response::Response,
};
use axum_extra::extract::cookie::Cookie;

use crate::error::AppError;
use crate::middleware::identify::Identify;
use crate::services::axsrf::{
    AXSRF_COOKIE, Authentication, CredentialValidator, IssuerHandle, TokenIssuer,
};

#[derive(Clone)]
pub struct CredentialLayer {
    validator: Arc<CredentialValidator>,
    issuer: Arc<TokenIssuer>,
    identify: Arc<dyn Identify>,
}

impl CredentialLayer {
    pub fn new(
        validator: Arc<CredentialValidator>,
        issuer: Arc<TokenIssuer>,
        identify: Arc<dyn Identify>,
    ) -> Self {
        Self {
            validator,
            issuer,
            identify,
        }
    }
}

/// Apply credential validation + issuer installation to the given Router.
pub fn apply<S>(router: Router<S>, layer: CredentialLayer) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(layer, credential_middleware))
}

async fn credential_middleware(
    State(layer): State<CredentialLayer>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let authentication = {
        let cookie = axsrf_cookie(req.headers());
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        layer.validator.authenticate(
            authorization,
            req.uri().query(),
            cookie.as_deref(),
        )
    };

    layer
        .identify
        .identify(req.extensions_mut(), authentication.identity())?;
    req.extensions_mut().insert::<Authentication>(authentication);

    // Install once; an outer chain that already installed a handle owns its cookie.
    let installed = match req.extensions().get::<IssuerHandle>() {
        Some(_) => None,
        None => {
            let handle = IssuerHandle::new(layer.issuer.clone());
            req.extensions_mut().insert(handle.clone());
            Some(handle)
        }
    };

    let mut res = next.run(req).await;

    if let Some(cookie) = installed.and_then(|h| h.take_cookie()) {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                res.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to encode axsrf cookie");
                return Err(AppError::Internal);
            }
        }
    }

    Ok(res)
}

/// Raw `axsrf` value from the `Cookie` headers. Values are not percent-decoded,
/// so the binding is checked against exactly what the client sent.
fn axsrf_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| Cookie::split_parse(v))
        .filter_map(Result::ok)
        .find(|c| c.name() == AXSRF_COOKIE)
        .map(|c| c.value().to_string())
}
