//! Engine Configuration
//!
//! Where the model artifacts and thresholds live, and how to turn them into
//! a ready `FailurePredictor`. Any failure here is fatal: the engine does not
//! start on partial configuration.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::constants;
use crate::logic::decision::FailurePredictor;
use crate::logic::model::{
    ConfigError, ModelLoadError, OnnxClassifier, OnnxDetector, ThresholdConfig, ThresholdStore,
};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] ModelLoadError),
}

/// Engine configuration
#[derive(Debug, Clone, Serialize)]
pub struct EngineConfig {
    pub stage1_model_path: PathBuf,
    pub stage2_model_path: PathBuf,
    pub thresholds_path: PathBuf,
    pub stage1_sha256: Option<String>,
    pub stage2_sha256: Option<String>,
    pub batch_workers: usize,
    pub max_batch_items: usize,
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            stage1_model_path: constants::get_stage1_model_path().into(),
            stage2_model_path: constants::get_stage2_model_path().into(),
            thresholds_path: constants::get_thresholds_path().into(),
            stage1_sha256: constants::get_stage1_sha256(),
            stage2_sha256: constants::get_stage2_sha256(),
            batch_workers: constants::get_batch_workers(),
            max_batch_items: constants::get_max_batch_items(),
        }
    }

    /// Thresholds first, then both models. Stage-2 output columns follow the
    /// configured `failure_codes` order.
    pub fn load_predictor(&self) -> Result<FailurePredictor, StartupError> {
        let thresholds = ThresholdConfig::load(&self.thresholds_path)?;
        log::info!(
            "Thresholds loaded from {} (stage1 {}, codes {:?})",
            self.thresholds_path.display(),
            thresholds.stage1_threshold(),
            thresholds.failure_codes()
        );

        let detector = OnnxDetector::load(&self.stage1_model_path, self.stage1_sha256.as_deref())?;
        let classifier = OnnxClassifier::load(
            &self.stage2_model_path,
            thresholds.failure_codes().to_vec(),
            self.stage2_sha256.as_deref(),
        )?;

        Ok(FailurePredictor::new(
            Arc::new(detector),
            Arc::new(classifier),
            Arc::new(ThresholdStore::new(thresholds)),
        ))
    }
}
