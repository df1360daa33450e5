/*
 * Responsibility
 * - 環境変数や設定の読み込み (HASHING_SECRET_KEY, ALLOW_ORIGIN, JSON_LIMIT など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::axsrf::HashAlgorithm;

pub const DEFAULT_JSON_LIMIT: usize = 64 * 1024;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Construction input of the filter chain.
///
/// Immutable once the chain is built; shared by every request.
#[derive(Clone)]
pub struct AxsrfOptions {
    pub hashing_secret_key: String,
    pub hashing_algorithm: HashAlgorithm,
    /// Fixed origin, or `*` / `None` to reflect the request `Origin`.
    pub allow_origin: Option<String>,
    /// Maximum request body size in bytes.
    pub json_limit: usize,
    /// Trace every validation decision at `debug` level.
    pub debug: bool,
}

impl fmt::Debug for AxsrfOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("AxsrfOptions")
            .field("hashing_algorithm", &self.hashing_algorithm)
            .field("allow_origin", &self.allow_origin)
            .field("json_limit", &self.json_limit)
            .field("debug", &self.debug)
            .finish()
    }
}

impl AxsrfOptions {
    pub fn new(hashing_secret_key: impl Into<String>, hashing_algorithm: HashAlgorithm) -> Self {
        Self {
            hashing_secret_key: hashing_secret_key.into(),
            hashing_algorithm,
            allow_origin: None,
            json_limit: DEFAULT_JSON_LIMIT,
            debug: false,
        }
    }

    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        self.allow_origin = Some(origin.into());
        self
    }

    pub fn json_limit(mut self, bytes: usize) -> Self {
        self.json_limit = bytes;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hashing_secret_key.is_empty() {
            return Err(ConfigError::Missing("HASHING_SECRET_KEY"));
        }
        if self.json_limit == 0 {
            return Err(ConfigError::Invalid("JSON_LIMIT"));
        }
        Ok(())
    }
}

/// Settings of the demo login route.
#[derive(Debug, Clone, Copy)]
pub struct LoginSettings {
    pub token_ttl: Duration,
    pub cookie_secure: bool,
}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub axsrf: AxsrfOptions,
    pub login: LoginSettings,
    /// Whole-request timeout of the HTTP layer (`REQUEST_TIMEOUT_SECONDS`).
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let hashing_secret_key = std::env::var("HASHING_SECRET_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("HASHING_SECRET_KEY"))?;

        let hashing_algorithm = std::env::var("HASHING_ALGORITHM")
            .map_err(|_| ConfigError::Missing("HASHING_ALGORITHM"))?
            .parse::<HashAlgorithm>()
            .map_err(|_| ConfigError::Invalid("HASHING_ALGORITHM"))?;

        let allow_origin = std::env::var("ALLOW_ORIGIN")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let json_limit = match std::env::var("JSON_LIMIT") {
            Ok(v) => v
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::Invalid("JSON_LIMIT"))?,
            Err(_) => DEFAULT_JSON_LIMIT,
        };

        let debug = std::env::var("AXSRF_DEBUG")
            .ok()
            .is_some_and(|v| parse_flag(&v));

        let token_ttl_seconds = std::env::var("TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(3600);

        let cookie_secure = std::env::var("COOKIE_SECURE")
            .ok()
            .map(|v| parse_flag(&v))
            .unwrap_or_else(|| app_env.is_production());

        let request_timeout = match std::env::var("REQUEST_TIMEOUT_SECONDS") {
            Ok(v) => parse_timeout(&v).ok_or(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"))?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT,
        };

        let axsrf = AxsrfOptions {
            hashing_secret_key,
            hashing_algorithm,
            allow_origin,
            json_limit,
            debug,
        };
        axsrf.validate()?;

        Ok(Self {
            addr,
            app_env,
            axsrf,
            login: LoginSettings {
                token_ttl: Duration::from_secs(token_ttl_seconds),
                cookie_secure,
            },
            request_timeout,
        })
    }
}

fn parse_timeout(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
