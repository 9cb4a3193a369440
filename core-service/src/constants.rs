//! Central Configuration Constants
//!
//! Single source of truth for engine configuration defaults.

/// Default stage-1 model artifact
pub const DEFAULT_STAGE1_MODEL_PATH: &str = "models/stage1_failure_detector.onnx";

/// Default stage-2 model artifact
pub const DEFAULT_STAGE2_MODEL_PATH: &str = "models/stage2_failure_classifier.onnx";

/// Default threshold file
pub const DEFAULT_THRESHOLDS_PATH: &str = "models/thresholds.json";

/// Default upper bound on items per batch request
pub const DEFAULT_MAX_BATCH_ITEMS: usize = 10_000;

/// Engine version
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Helper functions to read from env with fallback
// ============================================

pub fn get_stage1_model_path() -> String {
    std::env::var("STAGE1_MODEL_PATH").unwrap_or_else(|_| DEFAULT_STAGE1_MODEL_PATH.to_string())
}

pub fn get_stage2_model_path() -> String {
    std::env::var("STAGE2_MODEL_PATH").unwrap_or_else(|_| DEFAULT_STAGE2_MODEL_PATH.to_string())
}

pub fn get_thresholds_path() -> String {
    std::env::var("THRESHOLDS_PATH").unwrap_or_else(|_| DEFAULT_THRESHOLDS_PATH.to_string())
}

/// Pinned SHA-256 digests are optional; empty counts as unset
pub fn get_stage1_sha256() -> Option<String> {
    non_empty_var("STAGE1_MODEL_SHA256")
}

pub fn get_stage2_sha256() -> Option<String> {
    non_empty_var("STAGE2_MODEL_SHA256")
}

/// Batch workers from environment, or available parallelism
pub fn get_batch_workers() -> usize {
    std::env::var("BATCH_WORKERS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
}

pub fn get_max_batch_items() -> usize {
    std::env::var("MAX_BATCH_ITEMS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_BATCH_ITEMS)
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}
