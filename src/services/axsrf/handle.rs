use std::sync::Arc;
use std::time::Duration;

use axum_extra::extract::cookie::Cookie;
use parking_lot::Mutex;
use serde::Serialize;

use crate::services::axsrf::error::AxsrfError;
use crate::services::axsrf::issuer::TokenIssuer;

/// Per-request issuance capability.
///
/// Installed once into the request extensions by the filter chain. Calling
/// [`IssuerHandle::issue`] mints a credential and queues its `axsrf` cookie;
/// the chain writes the queued cookie to the response. Only the token is
/// returned to the handler.
#[derive(Debug, Clone)]
pub struct IssuerHandle {
    issuer: Arc<TokenIssuer>,
    pending: Arc<Mutex<Option<Cookie<'static>>>>,
}

impl IssuerHandle {
    pub fn new(issuer: Arc<TokenIssuer>) -> Self {
        Self {
            issuer,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Mint a credential bound to a fresh `axsrf` cookie.
    ///
    /// Issuing again within the same request replaces the queued cookie,
    /// so the response only ever carries the cookie of the last token.
    pub fn issue<P: Serialize + ?Sized>(
        &self,
        payload: &P,
        expires_in: Duration,
        only_secure: bool,
    ) -> Result<String, AxsrfError> {
        let issued = self.issuer.issue(payload, expires_in, only_secure)?;
        *self.pending.lock() = Some(issued.cookie);
        Ok(issued.token)
    }

    /// Take the cookie queued by the last `issue` call, if any.
    pub fn take_cookie(&self) -> Option<Cookie<'static>> {
        self.pending.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::services::axsrf::binding::{Binder, HashAlgorithm};
    use crate::services::axsrf::credential::CredentialCodec;

    fn handle() -> IssuerHandle {
        IssuerHandle::new(Arc::new(TokenIssuer::new(
            Binder::new(HashAlgorithm::Sha384, b"handle-secret"),
            CredentialCodec::new(b"handle-secret"),
        )))
    }

    #[test]
    fn issue_queues_cookie_and_returns_token_only() {
        let handle = handle();
        assert!(handle.take_cookie().is_none());

        let token = handle
            .issue(&json!({"sub": "u"}), Duration::from_secs(60), true)
            .unwrap();
        assert_eq!(token.split('.').count(), 3);

        let cookie = handle.take_cookie().expect("queued cookie");
        assert_eq!(cookie.name(), "axsrf");
        assert!(!token.contains(cookie.value()));
        assert!(handle.take_cookie().is_none());
    }

    #[test]
    fn clones_share_the_queue() {
        let handle = handle();
        let clone = handle.clone();

        clone.issue(&json!({}), Duration::from_secs(60), false).unwrap();
        assert!(handle.take_cookie().is_some());
    }

    #[test]
    fn last_issue_wins() {
        let handle = handle();
        handle.issue(&json!({}), Duration::from_secs(60), false).unwrap();
        let first = handle.pending.lock().clone().unwrap();
        handle.issue(&json!({}), Duration::from_secs(60), false).unwrap();

        assert_ne!(handle.take_cookie().unwrap().value(), first.value());
    }
}
