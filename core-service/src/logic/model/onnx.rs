//! ONNX Stage Adapters
//!
//! Stage-1 and stage-2 backed by ONNX Runtime sessions.
//!
//! Tensor contract:
//! - input: one `(1, FEATURE_COUNT)` f32 row in `FEATURE_LAYOUT` order
//! - stage-1 output: `[P(ok), P(fail)]` or a single `P(fail)`
//! - stage-2 output: one `P(code)` per label, or `[P(no), P(yes)]` pairs per
//!   label, in the label order given at load time

use std::path::Path;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::logic::decision::FailureCode;
use crate::logic::features::{check_input_shape, FeatureVector, FEATURE_COUNT};
use super::checksum::verify_checksum;
use super::inference::{
    check_probability, ClassScores, FailureClassifier, FailureDetector, InferenceError,
    ModelLoadError, Stage,
};

/// Output preferred when a model exposes several (skl2onnx naming)
const PROBABILITY_OUTPUT: &str = "probabilities";

// ============================================================================
// METADATA
// ============================================================================

/// Loaded model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub sha256: String,
    pub output_name: String,
    pub loaded_at: DateTime<Utc>,
}

// ============================================================================
// SESSION
// ============================================================================

/// ONNX session plus the output it is read from.
///
/// `Session::run` needs `&mut`, so concurrent predictions serialize on the
/// mutex while the rest of the engine stays lock-free.
struct OnnxSession {
    session: Mutex<Session>,
    metadata: ModelMetadata,
}

impl OnnxSession {
    fn load(model_path: &Path, expected_sha256: Option<&str>) -> Result<Self, ModelLoadError> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ModelLoadError::NotFound(model_path.display().to_string()));
        }

        let sha256 = verify_checksum(model_path, expected_sha256)?;

        let session = Session::builder()
            .map_err(|e| ModelLoadError::Session(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelLoadError::Session(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ModelLoadError::Session(format!("Failed to load model: {}", e)))?;

        // A tensor input with a known shape must take one layout row
        if let Some(shape) = session.inputs.first().and_then(|i| i.input_type.tensor_shape()) {
            let declared: Vec<i64> = shape.iter().copied().collect();
            check_input_shape(&declared).map_err(|mismatch| ModelLoadError::InputShape {
                path: model_path.display().to_string(),
                mismatch,
            })?;
        }

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name == PROBABILITY_OUTPUT)
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .ok_or_else(|| ModelLoadError::Session("No output defined".to_string()))?;

        log::info!("ONNX model loaded (output '{}', sha256 {})", output_name, short_digest(&sha256));

        Ok(Self {
            session: Mutex::new(session),
            metadata: ModelMetadata {
                model_path: model_path.display().to_string(),
                sha256,
                output_name,
                loaded_at: Utc::now(),
            },
        })
    }

    /// Run one row through the model and copy out the probability output
    fn run(&self, stage: Stage, features: &FeatureVector) -> Result<Vec<f32>, InferenceError> {
        let fail = |message: String| InferenceError { stage, message };

        let input_array = Array2::<f32>::from_shape_vec(
            (1, FEATURE_COUNT),
            features.to_model_input().to_vec(),
        )
        .map_err(|e| fail(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| fail(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| fail(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.metadata.output_name)
            .ok_or_else(|| fail(format!("No output '{}'", self.metadata.output_name)))?;

        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| fail(format!("Extract error: {}", e)))?;

        let data = output_tensor.1.to_vec();
        Ok(data)
    }
}

// ============================================================================
// STAGE-1
// ============================================================================

/// Stage-1 binary failure detector
pub struct OnnxDetector {
    inner: OnnxSession,
}

impl OnnxDetector {
    pub fn load(model_path: impl AsRef<Path>, expected_sha256: Option<&str>) -> Result<Self, ModelLoadError> {
        Ok(Self {
            inner: OnnxSession::load(model_path.as_ref(), expected_sha256)?,
        })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.inner.metadata
    }
}

impl FailureDetector for OnnxDetector {
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        let data = self.inner.run(Stage::Detector, features)?;
        let p_fail = detector_probability(&data)?;
        check_probability(Stage::Detector, p_fail)
    }

    fn describe(&self) -> String {
        let meta = self.metadata();
        format!("onnx:{} sha256:{}", meta.model_path, short_digest(&meta.sha256))
    }
}

/// Leading 12 hex digits of a model digest
fn short_digest(sha256: &str) -> &str {
    sha256.get(..12).unwrap_or(sha256)
}

/// Positive-class probability from a stage-1 output row
fn detector_probability(data: &[f32]) -> Result<f64, InferenceError> {
    match data {
        [p_fail] => Ok(*p_fail as f64),
        [_, p_fail] => Ok(*p_fail as f64),
        other => Err(InferenceError::detector(format!(
            "unexpected output width {} (expected 1 or 2)",
            other.len()
        ))),
    }
}

// ============================================================================
// STAGE-2
// ============================================================================

/// Stage-2 multi-label failure classifier
pub struct OnnxClassifier {
    inner: OnnxSession,
    labels: Vec<FailureCode>,
}

impl OnnxClassifier {
    /// `labels` is the order of the model's output columns
    pub fn load(
        model_path: impl AsRef<Path>,
        labels: Vec<FailureCode>,
        expected_sha256: Option<&str>,
    ) -> Result<Self, ModelLoadError> {
        Ok(Self {
            inner: OnnxSession::load(model_path.as_ref(), expected_sha256)?,
            labels,
        })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.inner.metadata
    }

    pub fn labels(&self) -> &[FailureCode] {
        &self.labels
    }
}

impl FailureClassifier for OnnxClassifier {
    fn predict_probabilities(&self, features: &FeatureVector) -> Result<ClassScores, InferenceError> {
        let data = self.inner.run(Stage::Classifier, features)?;
        classifier_scores(&self.labels, &data)
    }

    fn describe(&self) -> String {
        let meta = self.metadata();
        let labels: Vec<&str> = self.labels().iter().map(FailureCode::as_str).collect();
        format!(
            "onnx:{} sha256:{} labels:{}",
            meta.model_path,
            short_digest(&meta.sha256),
            labels.join(",")
        )
    }
}

/// Map a stage-2 output row onto labels
fn classifier_scores(labels: &[FailureCode], data: &[f32]) -> Result<ClassScores, InferenceError> {
    let n = labels.len();

    let positive = |i: usize| -> f64 {
        if data.len() == n {
            data[i] as f64
        } else {
            data[2 * i + 1] as f64
        }
    };

    if data.len() != n && data.len() != 2 * n {
        return Err(InferenceError::classifier(format!(
            "unexpected output width {} for {} labels",
            data.len(),
            n
        )));
    }

    labels
        .iter()
        .enumerate()
        .map(|(i, code)| check_probability(Stage::Classifier, positive(i)).map(|p| (*code, p)))
        .collect()
}
