//! slsframe API Server
//!
//! Run with: cargo run --bin slsframe
//!
//! Configuration is read from the first config file found
//! (`~/.config/slsframe/config.toml`, `/etc/slsframe/config.toml`,
//! `./config.toml`) with `SLSFRAME_*` environment overrides. `RUST_LOG`
//! takes precedence over the configured log level.

use slsframe::api::{serve, AppState};
use slsframe::config::{Config, LoggingConfig};
use slsframe::query::QueryExecutor;
use slsframe::source::FileSource;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("Starting slsframe API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        data_dir = %config.source.data_dir,
        project = %config.source.project,
        log_store = %config.source.log_store,
        line_limit = config.query.line_limit,
        "Log source configured"
    );

    let source = Arc::new(FileSource::new(
        &config.source.data_dir,
        &config.source.project,
        &config.source.log_store,
    ));

    let executor =
        Arc::new(QueryExecutor::new(source).with_line_limit(config.query.line_limit));

    let health = executor.check_health().await;
    if health.is_ok() {
        tracing::info!("Log store reachable");
    } else {
        tracing::warn!("Log store not reachable yet: {}", health.message);
    }

    let state = AppState::new(executor, config.api.clone());
    serve(state, &config.api).await?;

    tracing::info!("slsframe API server stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("slsframe={},tower_http=debug", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
