//! The ordered filter chain applied to every inbound request:
//! body limit → CORS responder → credential validator + issuer installation → handler.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::{AxsrfOptions, ConfigError};
use crate::middleware::axsrf::{self, CredentialLayer};
use crate::middleware::cors::{self, CorsPolicy};
use crate::middleware::identify::Identify;
use crate::services::axsrf::{Binder, CredentialCodec, CredentialValidator, TokenIssuer};

/// Built once at startup from [`AxsrfOptions`]; cheap to clone.
#[derive(Clone)]
pub struct AxsrfChain {
    cors: CorsPolicy,
    json_limit: usize,
    validator: Arc<CredentialValidator>,
    issuer: Arc<TokenIssuer>,
    identify: Arc<dyn Identify>,
}

impl std::fmt::Debug for AxsrfChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxsrfChain")
            .field("cors", &self.cors)
            .field("json_limit", &self.json_limit)
            .finish()
    }
}

impl AxsrfChain {
    /// Missing secret or a malformed origin is fatal here, never per request.
    pub fn new(options: &AxsrfOptions, identify: impl Identify + 'static) -> Result<Self, ConfigError> {
        options.validate()?;

        let cors = CorsPolicy::from_allow_origin(options.allow_origin.as_deref())?;
        if cors == CorsPolicy::MirrorRequest {
            tracing::warn!(
                "ALLOW_ORIGIN is unset or '*': request origins are reflected with credentials allowed. \
                 Configure a fixed origin to restrict cross-origin access."
            );
        }

        let secret = options.hashing_secret_key.as_bytes();
        let binder = Binder::new(options.hashing_algorithm, secret);
        let codec = CredentialCodec::new(secret);

        Ok(Self {
            cors,
            json_limit: options.json_limit,
            validator: Arc::new(CredentialValidator::new(
                binder.clone(),
                codec.clone(),
                options.debug,
            )),
            issuer: Arc::new(TokenIssuer::new(binder, codec)),
            identify: Arc::new(identify),
        })
    }

    pub fn issuer(&self) -> Arc<TokenIssuer> {
        self.issuer.clone()
    }

    pub fn validator(&self) -> Arc<CredentialValidator> {
        self.validator.clone()
    }

    /// Wrap `router` with the chain. Layers added later run first, so they
    /// are added innermost-first.
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let router = axsrf::apply(
            router,
            CredentialLayer::new(
                self.validator.clone(),
                self.issuer.clone(),
                self.identify.clone(),
            ),
        );
        let router = cors::apply(router, self.cors.clone());

        // `JSON_LIMIT` replaces axum's 2 MiB extractor default in both directions.
        router
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(self.json_limit))
    }
}
