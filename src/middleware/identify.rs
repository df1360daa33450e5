//! Identify hooks: what the application does with the validation outcome.
//!
//! The credential layer calls the hook exactly once per request, with the
//! verified identity or `None`. The layer itself never rejects; a hook may.

use axum::http::Extensions;

use crate::error::AppError;
use crate::services::axsrf::Identity;

pub trait Identify: Send + Sync {
    /// `extensions` are the request extensions seen by downstream handlers.
    fn identify(
        &self,
        extensions: &mut Extensions,
        identity: Option<&Identity>,
    ) -> Result<(), AppError>;
}

impl<F> Identify for F
where
    F: Fn(&mut Extensions, Option<&Identity>) -> Result<(), AppError> + Send + Sync,
{
    fn identify(
        &self,
        extensions: &mut Extensions,
        identity: Option<&Identity>,
    ) -> Result<(), AppError> {
        self(extensions, identity)
    }
}

/// Anonymous requests continue; handlers decide per route.
#[derive(Debug, Clone, Copy, Default)]
pub struct Permissive;

impl Identify for Permissive {
    fn identify(&self, _: &mut Extensions, _: Option<&Identity>) -> Result<(), AppError> {
        Ok(())
    }
}

/// Anonymous requests are rejected with 401.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireIdentity;

impl Identify for RequireIdentity {
    fn identify(&self, _: &mut Extensions, identity: Option<&Identity>) -> Result<(), AppError> {
        identity.map(|_| ()).ok_or(AppError::Unauthorized)
    }
}
