//! Engine status handler

use axum::{extract::State, Json};
use serde::Serialize;

use failwatch_core::EngineStatus;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ServerStatus {
    pub environment: String,
    pub batch_workers: usize,
    pub max_batch_items: usize,
    pub engine: EngineStatus,
}

pub async fn get(State(state): State<AppState>) -> Json<ServerStatus> {
    Json(ServerStatus {
        environment: state.config.environment.clone(),
        batch_workers: state.runner.workers(),
        max_batch_items: state.config.engine.max_batch_items,
        engine: state.predictor.status(),
    })
}
