//! Stateless CORS + cookie-bound bearer credential filter chain for axum.
//!
//! Every request passes, in order: body limit → CORS responder → credential
//! validator (identity or anonymous, never an error) → issuer installation →
//! handler. Handlers that log a caller in take an
//! [`IssuerHandle`](services::axsrf::IssuerHandle) and call `issue`; the
//! chain sets the matching `axsrf` cookie on the response.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
