//! Blog front-end binary entrypoint.
//! Boots the Axum HTTP server, wiring the remote API client, feed source,
//! metrics and middleware.

use blog_front::{api, metrics::Metrics, ApiConfig, AppState};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact tracing logs, enabled with BLOG_FRONT_LOG=1.
fn enable_tracing() {
    let on = std::env::var("BLOG_FRONT_LOG")
        .ok()
        .is_some_and(|v| v == "1");
    if !on {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blog_front=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    enable_tracing();

    let cfg = ApiConfig::load_default()?;
    tracing::info!(
        base_url = %cfg.base_url,
        max_pages = cfg.max_pages_per_request,
        "blog api config loaded"
    );

    let metrics = Metrics::init(&cfg)?;
    let state = AppState::from_config(cfg)?;
    let router = api::router(state).merge(metrics.router());

    Ok(router.into())
}
