//! Bearer credential validation.
//!
//! Extraction (first match wins):
//! 1. `Authorization` header, `Bearer` prefix (any case) stripped and trimmed
//! 2. `token` query parameter
//!
//! The literal `"null"` counts as absent at each step. Verification then
//! requires a valid signature, `exp` strictly in the future, and an `axsrf`
//! cookie whose HMAC equals the credential's `axsrf` claim.

use serde_json::Value;
use tracing::debug;

use crate::services::axsrf::binding::Binder;
use crate::services::axsrf::credential::{CredentialCodec, Identity};

/// Why a request ended up anonymous. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnonymousReason {
    NoCredential,
    Malformed,
    Expired,
    MissingCookie,
    BindingMismatch,
}

/// Outcome of credential validation for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Authentication {
    Authenticated(Identity),
    Anonymous(AnonymousReason),
}

impl Authentication {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Anonymous(_) => None,
        }
    }

    pub fn into_identity(self) -> Option<Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Anonymous(_) => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

#[derive(Debug, Clone)]
pub struct CredentialValidator {
    binder: Binder,
    codec: CredentialCodec,
    debug: bool,
}

impl CredentialValidator {
    pub fn new(binder: Binder, codec: CredentialCodec, debug: bool) -> Self {
        Self {
            binder,
            codec,
            debug,
        }
    }

    /// Validate the credential of one request.
    ///
    /// - `authorization`: raw `Authorization` header value
    /// - `query`: raw query string (without `?`)
    /// - `cookie`: current `axsrf` cookie value
    pub fn authenticate(
        &self,
        authorization: Option<&str>,
        query: Option<&str>,
        cookie: Option<&str>,
    ) -> Authentication {
        self.authenticate_at(authorization, query, cookie, chrono::Utc::now().timestamp())
    }

    fn authenticate_at(
        &self,
        authorization: Option<&str>,
        query: Option<&str>,
        cookie: Option<&str>,
        now: i64,
    ) -> Authentication {
        let Some(candidate) = extract_candidate(authorization, query) else {
            self.trace(AnonymousReason::NoCredential);
            return Authentication::Anonymous(AnonymousReason::NoCredential);
        };

        match self.verify(&candidate, cookie, now) {
            Ok(identity) => {
                if self.debug {
                    debug!(exp = ?identity.exp(), "credential accepted");
                }
                Authentication::Authenticated(identity)
            }
            Err(reason) => {
                self.trace(reason);
                Authentication::Anonymous(reason)
            }
        }
    }

    fn verify(
        &self,
        token: &str,
        cookie: Option<&str>,
        now: i64,
    ) -> Result<Identity, AnonymousReason> {
        let claims = self.codec.verify(token).map_err(|e| {
            if self.debug {
                debug!(error = %e, "credential signature/format check failed");
            }
            AnonymousReason::Malformed
        })?;

        // Seconds granularity; a fractional `exp` is compared as-is.
        let exp = claims.get("exp").and_then(Value::as_f64);
        if !exp.is_some_and(|exp| exp > now as f64) {
            return Err(AnonymousReason::Expired);
        }

        let cookie = cookie
            .filter(|c| !c.is_empty())
            .ok_or(AnonymousReason::MissingCookie)?;

        let claimed = claims
            .get("axsrf")
            .and_then(Value::as_str)
            .ok_or(AnonymousReason::BindingMismatch)?;

        if !self.binder.matches(cookie, claimed) {
            return Err(AnonymousReason::BindingMismatch);
        }

        Ok(Identity::new(claims))
    }

    fn trace(&self, reason: AnonymousReason) {
        if self.debug {
            debug!(?reason, "request is anonymous");
        }
    }
}

/// Pick the candidate credential string, or `None` when there is nothing to verify.
///
/// `"null"` is dropped from the header before falling back to the query, so
/// `Authorization: null` with `?token=xyz` yields `xyz`, the same as a request
/// without the header.
pub fn extract_candidate(authorization: Option<&str>, query: Option<&str>) -> Option<String> {
    if let Some(token) = authorization.map(strip_bearer).and_then(non_null) {
        return Some(token.to_string());
    }

    query
        .and_then(query_token)
        .filter(|token| non_null(token).is_some())
}

fn strip_bearer(value: &str) -> &str {
    match value.get(..6) {
        Some(prefix) if value.len() > 6 && prefix.eq_ignore_ascii_case("bearer") => {
            value[6..].trim()
        }
        _ => value,
    }
}

fn non_null(value: &str) -> Option<&str> {
    match value {
        "" | "null" => None,
        v => Some(v),
    }
}

fn query_token(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::services::axsrf::binding::HashAlgorithm;
    use crate::services::axsrf::credential::Claims;
    use crate::services::axsrf::issuer::{IssuedCredential, TokenIssuer};

    const SECRET: &[u8] = b"validator-secret";

    fn validator() -> CredentialValidator {
        CredentialValidator::new(
            Binder::new(HashAlgorithm::Sha256, SECRET),
            CredentialCodec::new(SECRET),
            true,
        )
    }

    fn issue(ttl: Duration) -> IssuedCredential {
        TokenIssuer::new(
            Binder::new(HashAlgorithm::Sha256, SECRET),
            CredentialCodec::new(SECRET),
        )
        .issue(&json!({"sub": "user-1", "role": "admin"}), ttl, false)
        .unwrap()
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[test]
    fn strips_bearer_prefix_in_any_case() {
        assert_eq!(extract_candidate(Some("Bearer abc"), None).as_deref(), Some("abc"));
        assert_eq!(extract_candidate(Some("bearer   abc  "), None).as_deref(), Some("abc"));
        assert_eq!(extract_candidate(Some("BEARER abc"), None).as_deref(), Some("abc"));
    }

    #[test]
    fn raw_header_without_prefix_is_used_as_is() {
        assert_eq!(extract_candidate(Some("abc.def.ghi"), None).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn falls_back_to_token_query_parameter() {
        assert_eq!(
            extract_candidate(None, Some("a=1&token=xyz%2E1")).as_deref(),
            Some("xyz.1")
        );
        assert_eq!(extract_candidate(Some(""), Some("token=xyz")).as_deref(), Some("xyz"));
        assert_eq!(extract_candidate(Some("Bearer  "), Some("token=xyz")).as_deref(), Some("xyz"));
    }

    #[test]
    fn header_wins_over_query() {
        assert_eq!(
            extract_candidate(Some("Bearer from-header"), Some("token=from-query")).as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn literal_null_is_absent() {
        assert_eq!(extract_candidate(Some("null"), None), None);
        assert_eq!(extract_candidate(Some("Bearer null"), None), None);
        assert_eq!(extract_candidate(None, Some("token=null")), None);
        assert_eq!(
            extract_candidate(Some("null"), Some("token=xyz")),
            extract_candidate(None, Some("token=xyz"))
        );
        assert_eq!(
            extract_candidate(Some("null"), Some("token=xyz")).as_deref(),
            Some("xyz")
        );
    }

    #[test]
    fn nothing_to_verify_is_anonymous() {
        let v = validator();
        assert_eq!(
            v.authenticate(None, None, Some("cookie")),
            Authentication::Anonymous(AnonymousReason::NoCredential)
        );
        assert_eq!(
            v.authenticate(Some("null"), Some("other=1"), None),
            Authentication::Anonymous(AnonymousReason::NoCredential)
        );
    }

    #[test]
    fn issued_credential_with_paired_cookie_authenticates() {
        let issued = issue(Duration::from_secs(300));
        let auth = validator().authenticate(
            Some(&bearer(&issued.token)),
            None,
            Some(issued.cookie.value()),
        );

        let identity = auth.into_identity().expect("authenticated");
        assert_eq!(identity.get("sub"), Some(&json!("user-1")));
        assert_eq!(identity.get("role"), Some(&json!("admin")));
        assert!(identity.axsrf().is_some());
        assert!(identity.iat().is_some());
        assert_eq!(identity.exp(), Some(issued.expires_at));
    }

    #[test]
    fn query_token_authenticates_too() {
        let issued = issue(Duration::from_secs(300));
        let query = format!("token={}", issued.token);

        assert!(validator()
            .authenticate(None, Some(&query), Some(issued.cookie.value()))
            .is_authenticated());
    }

    #[test]
    fn other_cookie_value_fails_binding() {
        let issued = issue(Duration::from_secs(300));
        let other = issue(Duration::from_secs(300));

        assert_eq!(
            validator().authenticate(Some(&bearer(&issued.token)), None, Some(other.cookie.value())),
            Authentication::Anonymous(AnonymousReason::BindingMismatch)
        );
        assert_eq!(
            validator().authenticate(Some(&bearer(&issued.token)), None, Some("a999999999999999")),
            Authentication::Anonymous(AnonymousReason::BindingMismatch)
        );
    }

    #[test]
    fn missing_cookie_fails() {
        let issued = issue(Duration::from_secs(300));

        assert_eq!(
            validator().authenticate(Some(&bearer(&issued.token)), None, None),
            Authentication::Anonymous(AnonymousReason::MissingCookie)
        );
    }

    #[test]
    fn expired_credential_fails_even_with_binding() {
        let issued = issue(Duration::ZERO);

        assert_eq!(
            validator().authenticate(Some(&bearer(&issued.token)), None, Some(issued.cookie.value())),
            Authentication::Anonymous(AnonymousReason::Expired)
        );
    }

    #[test]
    fn exp_must_be_strictly_in_the_future() {
        let issued = issue(Duration::from_secs(10));
        let v = validator();
        let header = bearer(&issued.token);
        let cookie = Some(issued.cookie.value());

        assert!(v
            .authenticate_at(Some(&header), None, cookie, issued.expires_at - 1)
            .is_authenticated());
        assert_eq!(
            v.authenticate_at(Some(&header), None, cookie, issued.expires_at),
            Authentication::Anonymous(AnonymousReason::Expired)
        );
    }

    #[test]
    fn credential_without_exp_fails() {
        let binder = Binder::new(HashAlgorithm::Sha256, SECRET);
        let mut claims = Claims::new();
        claims.insert("axsrf".into(), json!(binder.digest("cookie").unwrap()));
        let token = CredentialCodec::new(SECRET).sign(&claims).unwrap();

        assert_eq!(
            validator().authenticate(Some(&bearer(&token)), None, Some("cookie")),
            Authentication::Anonymous(AnonymousReason::Expired)
        );
    }

    #[test]
    fn tampered_signature_fails() {
        let issued = issue(Duration::from_secs(300));
        let sig_start = issued.token.rfind('.').unwrap() + 1;
        let mut bytes = issued.token.clone().into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(
            validator().authenticate(Some(&bearer(&tampered)), None, Some(issued.cookie.value())),
            Authentication::Anonymous(AnonymousReason::Malformed)
        );
    }

    #[test]
    fn credential_from_other_secret_fails() {
        let foreign = TokenIssuer::new(
            Binder::new(HashAlgorithm::Sha256, b"other"),
            CredentialCodec::new(b"other"),
        )
        .issue(&json!({"sub": "x"}), Duration::from_secs(300), false)
        .unwrap();

        assert_eq!(
            validator().authenticate(Some(&bearer(&foreign.token)), None, Some(foreign.cookie.value())),
            Authentication::Anonymous(AnonymousReason::Malformed)
        );
    }
}
