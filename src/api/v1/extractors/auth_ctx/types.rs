/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納した Authentication から作る
 *
 * Notes
 * - credential の署名・期限・axsrf binding の検証は services/middleware 側の責務
 * - claims の形はアプリ定義。ここでは加工しない
 */

use crate::services::axsrf::Identity;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `identity` は検証済み claims そのもの (`axsrf` / `iat` / `exp` を含む)
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub identity: Identity,
}

impl AuthCtx {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    /// `sub` claim, when the caller put one in the payload.
    pub fn subject(&self) -> Option<&str> {
        self.identity.get("sub").and_then(|v| v.as_str())
    }
}
