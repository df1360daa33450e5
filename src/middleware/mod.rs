/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - filter chain: body limit → CORS → credential 検証 + issuer 配置 → handler
 */
pub mod axsrf;
pub mod chain;
pub mod cors;
pub mod http;
pub mod identify;

pub use chain::AxsrfChain;
pub use cors::CorsPolicy;
pub use identify::{Identify, Permissive, RequireIdentity};
