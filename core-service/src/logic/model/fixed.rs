//! Deterministic stages
//!
//! Stand-ins for the trained models: fixed scores, scripted per-input
//! scores, and call counters to check which stages actually ran.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::logic::decision::FailureCode;
use crate::logic::features::FeatureVector;
use super::inference::{ClassScores, FailureClassifier, FailureDetector, InferenceError};

// ============================================================================
// FIXED STAGE-1
// ============================================================================

/// Returns the same probability (or error) for every input
#[derive(Debug)]
pub struct FixedDetector {
    result: Result<f64, InferenceError>,
    calls: AtomicUsize,
}

impl FixedDetector {
    pub fn new(probability: f64) -> Self {
        Self { result: Ok(probability), calls: AtomicUsize::new(0) }
    }

    pub fn failing(message: &str) -> Self {
        Self { result: Err(InferenceError::detector(message)), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FailureDetector for FixedDetector {
    fn predict_probability(&self, _features: &FeatureVector) -> Result<f64, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }

    fn describe(&self) -> String {
        "fixed".to_string()
    }
}

// ============================================================================
// FIXED STAGE-2
// ============================================================================

/// Returns the same score table (or error) for every input
#[derive(Debug)]
pub struct FixedClassifier {
    result: Result<ClassScores, InferenceError>,
    calls: AtomicUsize,
}

impl FixedClassifier {
    pub fn new(scores: &[(FailureCode, f64)]) -> Self {
        Self {
            result: Ok(scores.iter().copied().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every model code scored with the same probability
    pub fn uniform(probability: f64) -> Self {
        let scores: Vec<(FailureCode, f64)> = FailureCode::MODEL_CODES
            .iter()
            .map(|code| (*code, probability))
            .collect();
        Self::new(&scores)
    }

    pub fn failing(message: &str) -> Self {
        Self { result: Err(InferenceError::classifier(message)), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FailureClassifier for FixedClassifier {
    fn predict_probabilities(&self, _features: &FeatureVector) -> Result<ClassScores, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }

    fn describe(&self) -> String {
        "fixed".to_string()
    }
}

// ============================================================================
// SCRIPTED STAGE-1
// ============================================================================

/// Stage-1 driven by a closure over the input
pub struct ScriptedDetector<F> {
    script: F,
    calls: AtomicUsize,
}

impl<F> ScriptedDetector<F>
where
    F: Fn(&FeatureVector) -> Result<f64, InferenceError> + Send + Sync,
{
    pub fn new(script: F) -> Self {
        Self { script, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<F> FailureDetector for ScriptedDetector<F>
where
    F: Fn(&FeatureVector) -> Result<f64, InferenceError> + Send + Sync,
{
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)(features)
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}
