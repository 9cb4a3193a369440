//! Model Module - Stage contracts, adapters and thresholds
//!
//! Keeps the trained classifiers behind traits so the decision policy can
//! swap ONNX sessions for fixed stubs.

pub mod inference;
pub mod onnx;
pub mod fixed;
pub mod checksum;
pub mod threshold;

// Re-export common types
pub use inference::{
    ClassScores, FailureClassifier, FailureDetector, InferenceError, ModelLoadError, Stage,
};
pub use onnx::{ModelMetadata, OnnxClassifier, OnnxDetector};
pub use fixed::{FixedClassifier, FixedDetector, ScriptedDetector};
pub use threshold::{ConfigError, ThresholdConfig, ThresholdStore};
