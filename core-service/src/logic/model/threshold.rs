//! Threshold Configuration
//!
//! Stage-1 gate threshold plus one threshold per failure code.
//! Loaded once at startup; a reload swaps the whole config atomically.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::decision::FailureCode;

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Invalid or unreadable threshold configuration. Always fatal at load.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read threshold file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed threshold config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} must be within [0, 1], got {value}")]
    OutOfRange { field: String, value: f64 },

    #[error("no threshold configured for {0}")]
    MissingThreshold(FailureCode),

    #[error("threshold configured for {0}, which is not a scored failure code")]
    UnexpectedThreshold(FailureCode),

    #[error("invalid failure_codes: {0}")]
    InvalidCodes(String),
}

// ============================================================================
// THRESHOLD CONFIG
// ============================================================================

/// On-disk shape, validated into `ThresholdConfig`
#[derive(Debug, Clone, Deserialize)]
struct RawThresholdConfig {
    stage1_threshold: f64,
    failure_thresholds: HashMap<FailureCode, f64>,
    failure_codes: Vec<FailureCode>,
}

/// Validated thresholds. Can only be built through `new` or the loaders,
/// so every instance satisfies the range and coverage rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdConfig {
    stage1_threshold: f64,
    failure_thresholds: BTreeMap<FailureCode, f64>,
    failure_codes: Vec<FailureCode>,
}

impl ThresholdConfig {
    pub fn new(
        stage1_threshold: f64,
        failure_thresholds: HashMap<FailureCode, f64>,
        failure_codes: Vec<FailureCode>,
    ) -> Result<Self, ConfigError> {
        check_unit_range("stage1_threshold", stage1_threshold)?;
        check_codes(&failure_codes)?;

        for code in &failure_codes {
            match failure_thresholds.get(code) {
                Some(value) => check_unit_range(&format!("failure_thresholds.{}", code), *value)?,
                None => return Err(ConfigError::MissingThreshold(*code)),
            }
        }

        let mut extra: Vec<FailureCode> = failure_thresholds
            .keys()
            .filter(|code| !failure_codes.contains(code))
            .copied()
            .collect();
        extra.sort();
        if let Some(code) = extra.first() {
            return Err(ConfigError::UnexpectedThreshold(*code));
        }

        Ok(Self {
            stage1_threshold,
            failure_thresholds: failure_thresholds.into_iter().collect(),
            failure_codes,
        })
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: RawThresholdConfig = serde_json::from_str(json)?;
        Self::new(raw.stage1_threshold, raw.failure_thresholds, raw.failure_codes)
    }

    /// Read and validate a JSON threshold file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn stage1_threshold(&self) -> f64 {
        self.stage1_threshold
    }

    /// Threshold for a scored code. `None` for RNF.
    pub fn threshold_for(&self, code: FailureCode) -> Option<f64> {
        self.failure_thresholds.get(&code).copied()
    }

    /// Evaluation and display order
    pub fn failure_codes(&self) -> &[FailureCode] {
        &self.failure_codes
    }
}

fn check_unit_range(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field: field.to_string(), value })
    }
}

/// failure_codes must be exactly the four model codes, each once
fn check_codes(codes: &[FailureCode]) -> Result<(), ConfigError> {
    if let Some(code) = codes.iter().find(|c| !c.is_model_code()) {
        return Err(ConfigError::InvalidCodes(format!(
            "{} is synthesized by the engine and cannot be configured",
            code
        )));
    }

    let mut seen = HashSet::new();
    for code in codes {
        if !seen.insert(*code) {
            return Err(ConfigError::InvalidCodes(format!("{} listed more than once", code)));
        }
    }

    for code in FailureCode::MODEL_CODES {
        if !seen.contains(&code) {
            return Err(ConfigError::InvalidCodes(format!("{} is missing", code)));
        }
    }

    Ok(())
}

// ============================================================================
// THRESHOLD STORE
// ============================================================================

/// Shared holder for the active config.
///
/// A prediction takes one `snapshot()` and uses it for its whole run, so a
/// concurrent `replace()` never changes thresholds mid-decision.
#[derive(Debug)]
pub struct ThresholdStore {
    current: RwLock<Arc<ThresholdConfig>>,
}

impl ThresholdStore {
    pub fn new(config: ThresholdConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
        }
    }

    pub fn snapshot(&self) -> Arc<ThresholdConfig> {
        self.current.read().clone()
    }

    /// Swap in a new config, returning the previous one
    pub fn replace(&self, config: ThresholdConfig) -> Arc<ThresholdConfig> {
        let next = Arc::new(config);
        let next_stage1 = next.stage1_threshold();
        let previous = std::mem::replace(&mut *self.current.write(), next);
        log::info!(
            "Threshold config replaced (stage1 {} -> {})",
            previous.stage1_threshold(),
            next_stage1
        );
        previous
    }

    /// Re-read the threshold file. On error the active config is untouched.
    pub fn reload_from(&self, path: impl AsRef<Path>) -> Result<Arc<ThresholdConfig>, ConfigError> {
        let config = ThresholdConfig::load(path.as_ref())?;
        self.replace(config);
        Ok(self.snapshot())
    }
}
