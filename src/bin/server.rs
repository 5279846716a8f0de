//! Foresight Server - HTTP prediction API
//!
//! Serves `POST /predict`, `GET /players/{id}/seasons`, `GET /health` and,
//! when enabled, `GET /metrics` in Prometheus text format.
//!
//! # Usage
//! ```sh
//! SERVER_PORT=8000 cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `DATABASE_URL` - SQLite store (default: sqlite://data/foresight.db)
//! - `SERVER_HOST` / `SERVER_PORT` - Bind address (default: 127.0.0.1:8000)
//! - `METRICS_ENABLED` - Expose /metrics (default: true)

use anyhow::Result;
use foresight::application::PredictionService;
use foresight::config::Config;
use foresight::infrastructure::observability::Metrics;
use foresight::infrastructure::{Database, SqliteGameLogRepository};
use foresight::interfaces::{AppState, router};
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Foresight Server {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: database={}, default season={}, profile={}",
        config.database_url, config.default_season, config.pipeline.response_profile
    );

    let db = Database::new(&config.database_url).await?;
    let repository = Arc::new(SqliteGameLogRepository::new(db.pool.clone()));

    let mut service =
        PredictionService::new(repository, config.pipeline_settings(), config.default_season);
    let metrics = if config.server.metrics_enabled {
        let metrics = Metrics::new()?;
        service = service.with_metrics(metrics.clone());
        info!("Metrics enabled on /metrics");
        Some(metrics)
    } else {
        info!("Metrics disabled.");
        None
    };

    let app = router(Arc::new(AppState { service, metrics }));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received. Exiting...");
        })
        .await?;

    Ok(())
}
