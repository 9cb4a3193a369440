//! Inference Contracts
//!
//! The two trained classifiers are opaque to the engine. They are reached
//! only through these traits, so the decision policy can run against ONNX
//! sessions in production and fixed-score stubs in tests.

use std::collections::HashMap;
use thiserror::Error;

use crate::logic::decision::FailureCode;
use crate::logic::features::{FeatureVector, LayoutMismatch};

// ============================================================================
// STAGES
// ============================================================================

/// Pipeline stage that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Detector,
    Classifier,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Detector => "stage-1 detector",
            Stage::Classifier => "stage-2 classifier",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// A stage could not score an input. Never retried by the engine.
#[derive(Debug, Clone, Error)]
#[error("{stage} inference failed: {message}")]
pub struct InferenceError {
    pub stage: Stage,
    pub message: String,
}

impl InferenceError {
    pub fn detector(message: impl Into<String>) -> Self {
        Self { stage: Stage::Detector, message: message.into() }
    }

    pub fn classifier(message: impl Into<String>) -> Self {
        Self { stage: Stage::Classifier, message: message.into() }
    }
}

/// Model artifact could not be turned into a usable stage
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model not found: {0}")]
    NotFound(String),

    #[error("failed to read model {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("model {path} rejected: {mismatch}")]
    InputShape {
        path: String,
        mismatch: LayoutMismatch,
    },

    #[error("onnx session error: {0}")]
    Session(String),
}

// ============================================================================
// STAGE TRAITS
// ============================================================================

/// Stage-2 output: one probability per configured failure code
pub type ClassScores = HashMap<FailureCode, f64>;

/// Stage-1: binary failure gate
pub trait FailureDetector: Send + Sync {
    /// Probability in `[0, 1]` that the machine is failing
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, InferenceError>;

    /// Short label for status output
    fn describe(&self) -> String {
        "detector".to_string()
    }
}

/// Stage-2: multi-label cause classifier
pub trait FailureClassifier: Send + Sync {
    /// Probability per failure code. Only called once stage-1 has fired.
    fn predict_probabilities(&self, features: &FeatureVector) -> Result<ClassScores, InferenceError>;

    fn describe(&self) -> String {
        "classifier".to_string()
    }
}

/// Reject NaN and out-of-range probabilities coming back from a model
pub fn check_probability(stage: Stage, value: f64) -> Result<f64, InferenceError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(InferenceError {
            stage,
            message: format!("probability out of range: {}", value),
        })
    }
}
