//! Failwatch Prediction Server
//!
//! HTTP front end for the two-stage machine failure engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    FAILWATCH SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌────────────────┐  ┌────────────────────┐ │
//! │  │  API      │  │  Threshold     │  │  Batch Runner      │ │
//! │  │  Gateway  │  │  Store         │  │  (rayon pool)      │ │
//! │  │  (Axum)   │  │  (hot reload)  │  │                    │ │
//! │  └─────┬─────┘  └───────┬────────┘  └─────────┬──────────┘ │
//! │        └────────────────┼─────────────────────┘            │
//! │                         ▼                                   │
//! │              ┌─────────────────────┐                        │
//! │              │  FailurePredictor   │                        │
//! │              │  (ONNX stage 1 + 2) │                        │
//! │              └─────────────────────┘                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod models;
mod handlers;
mod error;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use failwatch_core::{BatchRunner, FailurePredictor};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "failwatch_server=debug,failwatch_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Failwatch server starting ({})", config.environment);
    tracing::info!("Stage-1 model: {}", config.engine.stage1_model_path.display());
    tracing::info!("Stage-2 model: {}", config.engine.stage2_model_path.display());
    tracing::info!("Thresholds: {}", config.engine.thresholds_path.display());

    if config.is_production() && config.engine.stage1_sha256.is_none() {
        tracing::warn!("Running in production without pinned model checksums");
    }

    // Models and thresholds must load before anything is served
    let predictor = config.engine.load_predictor()
        .context("failed to initialise the prediction engine")?;
    let runner = BatchRunner::new(config.engine.batch_workers);

    // Build application state
    let state = AppState {
        predictor: Arc::new(predictor),
        runner: Arc::new(runner),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<FailurePredictor>,
    pub runner: Arc<BatchRunner>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::check))
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))

        // Batch
        .route("/api/v1/predict/batch", post(handlers::batch::predict_batch))

        // Thresholds
        .route("/api/v1/thresholds", get(handlers::thresholds::get))
        .route("/api/v1/thresholds/reload", post(handlers::thresholds::reload))

        // Engine
        .route("/api/v1/engine/status", get(handlers::status::get))

        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
