//! CORS responder for browser clients.
//!
//! Note:
//! - CORS is enforced by browsers. Native mobile apps and server-to-server calls are not
//!   restricted by CORS.
//! - This middleware never rejects. It only decorates the response and always
//!   continues the chain.
//!
//! Policy:
//! - `Access-Control-Allow-Headers`: echo of `Access-Control-Request-Headers`.
//! - `Access-Control-Allow-Origin`: fixed origin when configured, otherwise the
//!   request `Origin` is reflected (unset and `*` behave the same).
//! - `Access-Control-Allow-Credentials: true` always; `Vary: Origin` always.
//!
//! Reflecting the request origin is a permissive default: any site may make
//! credentialed calls. Configure a fixed origin to restrict it.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, Request, StatusCode, header},
    middleware::{self, Next},
    response::Response,
};

use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Echo the request `Origin`.
    MirrorRequest,
    /// Always answer with this origin.
    Fixed(HeaderValue),
}

impl CorsPolicy {
    pub fn from_allow_origin(allow_origin: Option<&str>) -> Result<Self, ConfigError> {
        match allow_origin.map(str::trim) {
            None | Some("") | Some("*") => Ok(Self::MirrorRequest),
            Some(origin) => HeaderValue::from_str(origin)
                .map(Self::Fixed)
                .map_err(|_| ConfigError::Invalid("ALLOW_ORIGIN")),
        }
    }

    /// `None` when mirroring and the request carries no `Origin`.
    pub fn resolve(&self, request_origin: Option<&HeaderValue>) -> Option<HeaderValue> {
        match self {
            Self::MirrorRequest => request_origin.cloned(),
            Self::Fixed(origin) => Some(origin.clone()),
        }
    }
}

/// Apply the CORS responder to the given Router.
pub fn apply<S>(router: Router<S>, policy: CorsPolicy) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(policy, cors_middleware))
}

async fn cors_middleware(
    State(policy): State<CorsPolicy>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let requested_headers = req
        .headers()
        .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
        .cloned();
    let allow_origin = policy.resolve(req.headers().get(header::ORIGIN));
    let is_options = *req.method() == Method::OPTIONS;

    let mut res = next.run(req).await;

    // Routes rarely declare OPTIONS; answer an unrouted preflight with 204
    // instead of 405 so browsers accept it.
    if is_options && res.status() == StatusCode::METHOD_NOT_ALLOWED {
        let mut preflight = Response::new(Body::empty());
        *preflight.status_mut() = StatusCode::NO_CONTENT;
        res = preflight;
    }

    let headers = res.headers_mut();
    if let Some(value) = requested_headers {
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, value);
    }
    if let Some(value) = allow_origin {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    if !varies_on_origin(headers) {
        headers.append(header::VARY, HeaderValue::from_static("Origin"));
    }

    res
}

fn varies_on_origin(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .any(|token| token == "*" || token.eq_ignore_ascii_case("origin"))
}
