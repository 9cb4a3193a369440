//! Single prediction handler

use axum::{extract::State, Json};
use validator::Validate;

use crate::{AppState, AppResult};
use crate::models::{MaintenanceReport, PredictRequest, PredictResponse, VehicleDetails};

/// Score one machine and attach the maintenance summary
pub async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> AppResult<Json<PredictResponse>> {
    req.validate()?;

    let features = req.features.to_feature_vector();

    // Inference holds the model session lock; keep it off the runtime threads
    let predictor = state.predictor.clone();
    let verdict = tokio::task::spawn_blocking(move || predictor.predict(&features)).await??;

    tracing::info!(
        vehicle = %req.vehicle_name,
        failure = verdict.failure_flag(),
        probability = verdict.display_probability(),
        "Prediction served"
    );

    let maintenance_report = MaintenanceReport::build(
        &verdict,
        features.machine_type(),
        VehicleDetails {
            name: &req.vehicle_name,
            model: &req.model,
            age_years: req.machine_age,
            total_km: req.total_kilometers,
        },
    );

    Ok(Json(PredictResponse {
        verdict,
        maintenance_report,
    }))
}
