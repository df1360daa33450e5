/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - ex: login 設定 (token TTL, cookie secure)
 * - Clone 前提で持つ (内部は Copy/Clone cheap)
 * - issuer / validator は filter chain が request extensions 経由で渡す
 */
use crate::config::LoginSettings;

#[derive(Clone, Debug)]
pub struct AppState {
    pub login: LoginSettings,
}

impl AppState {
    pub fn new(login: LoginSettings) -> Self {
        Self { login }
    }
}
