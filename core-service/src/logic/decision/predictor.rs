//! Failure Predictor
//!
//! Engine facade: both stages plus the shared threshold store.
//! Everything it holds is read-only at request time, so one instance is
//! shared across all concurrent predictions.

use std::sync::Arc;
use std::time::Instant;

use crate::constants;
use crate::logic::features::{FeatureVector, LayoutInfo};
use crate::logic::model::{FailureClassifier, FailureDetector, InferenceError, ThresholdStore};
use crate::logic::status::{EngineStats, EngineStatus};
use super::policy::decide;
use super::types::Verdict;

pub struct FailurePredictor {
    detector: Arc<dyn FailureDetector>,
    classifier: Arc<dyn FailureClassifier>,
    thresholds: Arc<ThresholdStore>,
    stats: EngineStats,
}

impl FailurePredictor {
    pub fn new(
        detector: Arc<dyn FailureDetector>,
        classifier: Arc<dyn FailureClassifier>,
        thresholds: Arc<ThresholdStore>,
    ) -> Self {
        Self {
            detector,
            classifier,
            thresholds,
            stats: EngineStats::new(),
        }
    }

    /// Score one vector against the thresholds active when the call starts
    pub fn predict(&self, features: &FeatureVector) -> Result<Verdict, InferenceError> {
        let start = Instant::now();
        let config = self.thresholds.snapshot();

        match decide(features, self.detector.as_ref(), self.classifier.as_ref(), &config) {
            Ok(verdict) => {
                let elapsed_us = start.elapsed().as_micros() as u64;
                self.stats.record_prediction(verdict.failed, elapsed_us);
                log::debug!(
                    "Prediction: failure={} p={:.3} in {}us",
                    verdict.failure_flag(),
                    verdict.failure_probability,
                    elapsed_us
                );
                Ok(verdict)
            }
            Err(e) => {
                self.stats.record_error();
                log::debug!("Prediction failed for {}: {}", features.to_log_entry(), e);
                Err(e)
            }
        }
    }

    pub fn thresholds(&self) -> &ThresholdStore {
        &self.thresholds
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            version: constants::ENGINE_VERSION.to_string(),
            layout: LayoutInfo::current(),
            detector: self.detector.describe(),
            classifier: self.classifier.describe(),
            stage1_threshold: self.thresholds.snapshot().stage1_threshold(),
            stats: self.stats.snapshot(),
        }
    }
}

impl std::fmt::Debug for FailurePredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailurePredictor")
            .field("detector", &self.detector.describe())
            .field("classifier", &self.classifier.describe())
            .field("thresholds", &self.thresholds.snapshot())
            .finish()
    }
}
