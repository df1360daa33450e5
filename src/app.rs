/*
 * Responsibility
 * - Config読み込み → filter chain 生成 → Router 組み立て
 * - Middleware の適用 (body limit / CORS / credential 検証 / request-id / trace)
 * - axum::serve() で起動
 */
use std::time::Duration;
use std::{panic, process};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{AxsrfOptions, Config, ConfigError, DEFAULT_REQUEST_TIMEOUT, LoginSettings};
use crate::middleware::{self, AxsrfChain, Permissive};
use crate::state::AppState;

fn init_tracing(debug: bool) {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,axsrf_cors=debug,tower_http=debug cargo run
    let default_filter = if debug {
        "info,axsrf_cors=debug,tower_http=info"
    } else {
        "info,tower_http=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get "lost"
        // (stderr can be hidden depending on how the process is launched.)
        tracing::error!(?info, "panic");

        // In development, fail fast: crash the whole process so we notice immediately.
        // In production, prefer the default behavior (stderr) and let the server keep running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.axsrf.debug);
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        algorithm = %config.axsrf.hashing_algorithm,
        json_limit = config.axsrf.json_limit,
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let chain = AxsrfChain::new(&config.axsrf, Permissive)?;
    let app = build_router(&chain, AppState::new(config.login), config.request_timeout);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Full application: v1 routes behind the filter chain, then HTTP-level layers.
pub fn build_app(options: &AxsrfOptions, login: LoginSettings) -> Result<Router, ConfigError> {
    let chain = AxsrfChain::new(options, Permissive)?;
    Ok(build_router(&chain, AppState::new(login), DEFAULT_REQUEST_TIMEOUT))
}

pub fn build_router(chain: &AxsrfChain, state: AppState, request_timeout: Duration) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes())
        .with_state(state);

    let router = chain.apply(router);
    middleware::http::apply(router, request_timeout)
}
