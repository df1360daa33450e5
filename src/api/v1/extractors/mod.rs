pub mod auth_ctx;
mod issuer;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor, MaybeAuthCtx};
