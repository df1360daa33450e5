use std::time::Duration;

use axum_extra::extract::cookie::Cookie;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::services::axsrf::binding::Binder;
use crate::services::axsrf::credential::{Claims, CredentialCodec};
use crate::services::axsrf::error::AxsrfError;

/// Name of the anti-forgery cookie.
pub const AXSRF_COOKIE: &str = "axsrf";

/// A freshly minted credential and the cookie it is bound to.
///
/// The cookie goes out as `Set-Cookie`, the token in the response body.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub token: String,
    pub cookie: Cookie<'static>,
    pub expires_at: i64,
}

/// Mints `axsrf` cookies and the credentials bound to them.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    binder: Binder,
    codec: CredentialCodec,
}

impl TokenIssuer {
    pub fn new(binder: Binder, codec: CredentialCodec) -> Self {
        Self { binder, codec }
    }

    /// Issue a credential for `payload`, valid for `ttl`.
    ///
    /// - `payload` must serialize to a JSON object (or unit / `None`).
    /// - A numeric `iat` in the payload is used as the issue time.
    /// - `exp` comes from `ttl`; a payload `exp` is rejected.
    /// - `axsrf` is always the binding of the new cookie.
    pub fn issue<P: Serialize + ?Sized>(
        &self,
        payload: &P,
        ttl: Duration,
        secure: bool,
    ) -> Result<IssuedCredential, AxsrfError> {
        let mut claims: Claims = match serde_json::to_value(payload).map_err(AxsrfError::Payload)? {
            Value::Object(map) => map,
            Value::Null => Claims::new(),
            _ => return Err(AxsrfError::PayloadNotObject),
        };

        if claims.contains_key("exp") {
            return Err(AxsrfError::PayloadHasExp);
        }

        let axsrf = generate_axsrf()?;
        let binding = self.binder.digest(&axsrf).map_err(|e| {
            error!(error = %e, "failed to key hmac for axsrf binding");
            AxsrfError::Key
        })?;

        let iat = claims
            .get("iat")
            .and_then(Value::as_i64)
            .unwrap_or_else(|| chrono::Utc::now().timestamp());
        let ttl_seconds = i64::try_from(ttl.as_secs()).map_err(|_| AxsrfError::ExpiryOutOfRange)?;
        let exp = iat
            .checked_add(ttl_seconds)
            .ok_or(AxsrfError::ExpiryOutOfRange)?;

        claims.insert("axsrf".to_string(), Value::String(binding));
        claims.insert("iat".to_string(), Value::from(iat));
        claims.insert("exp".to_string(), Value::from(exp));

        let token = self.codec.sign(&claims).map_err(|e| {
            error!(error = %e, "failed to sign credential");
            AxsrfError::Sign(e)
        })?;

        debug!(iat, exp, secure, "issued axsrf-bound credential");

        Ok(IssuedCredential {
            token,
            cookie: axsrf_cookie(axsrf, secure),
            expires_at: exp,
        })
    }
}

/// Fresh anti-forgery value: 32 bytes from the OS CSPRNG, URL-safe base64 without padding.
pub fn generate_axsrf() -> Result<String, AxsrfError> {
    let mut bytes = [0u8; 32];
    getrandom::fill(&mut bytes).map_err(AxsrfError::Entropy)?;

    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn axsrf_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((AXSRF_COOKIE, value))
        .http_only(true)
        .secure(secure)
        .path("/")
        .build()
}
