//! Stateless cookie-bound bearer credentials.
//!
//! A credential is accepted only when its signature verifies, its `exp` is
//! in the future, and its `axsrf` claim is the HMAC of the request's
//! current `axsrf` cookie. Nothing is stored server side.

pub mod binding;
pub mod credential;
pub mod error;
pub mod handle;
pub mod issuer;
pub mod validator;

pub use binding::{Binder, HashAlgorithm};
pub use credential::{Claims, CredentialCodec, Identity};
pub use error::AxsrfError;
pub use handle::IssuerHandle;
pub use issuer::{AXSRF_COOKIE, IssuedCredential, TokenIssuer};
pub use validator::{AnonymousReason, Authentication, CredentialValidator};
