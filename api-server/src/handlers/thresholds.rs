//! Threshold configuration handlers

use axum::{extract::State, Json};

use failwatch_core::ThresholdConfig;

use crate::{AppState, AppResult};

/// Active thresholds
pub async fn get(State(state): State<AppState>) -> Json<ThresholdConfig> {
    Json(state.predictor.thresholds().snapshot().as_ref().clone())
}

/// Re-read the threshold file. A rejected file leaves the active config in place.
pub async fn reload(State(state): State<AppState>) -> AppResult<Json<ThresholdConfig>> {
    let path = state.config.engine.thresholds_path.clone();
    let predictor = state.predictor.clone();
    let reload_path = path.clone();
    let config = tokio::task::spawn_blocking(move || predictor.thresholds().reload_from(&reload_path))
        .await??;

    tracing::info!("Thresholds reloaded from {}", path.display());

    Ok(Json(config.as_ref().clone()))
}
