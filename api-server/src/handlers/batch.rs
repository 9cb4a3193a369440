//! Batch prediction handler

use axum::{extract::State, Json};
use validator::Validate;

use failwatch_core::{BatchHooks, BatchReport};

use crate::{AppState, AppError, AppResult};
use crate::models::BatchRequest;

/// Score many machines. Items that fail inference come back degraded in
/// place; the request itself only fails on invalid input.
pub async fn predict_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchRequest>,
) -> AppResult<Json<BatchReport>> {
    req.validate()?;

    let max_items = state.config.engine.max_batch_items;
    if req.items.len() > max_items {
        return Err(AppError::ValidationError(format!(
            "batch of {} items exceeds the limit of {}",
            req.items.len(),
            max_items
        )));
    }

    let items = req.into_items();
    let predictor = state.predictor.clone();
    let runner = state.runner.clone();

    let report = tokio::task::spawn_blocking(move || {
        let hooks = BatchHooks::default().with_progress(|p| {
            tracing::debug!(completed = p.completed, total = p.total, "Batch progress");
        });
        runner.run_with(&predictor, &items, &hooks)
    })
    .await?;

    if report.degraded > 0 {
        tracing::warn!(
            "Batch {}: {} of {} items degraded",
            report.batch_id,
            report.degraded,
            report.total
        );
    }

    Ok(Json(report))
}
