//! Feature Vector - Core data structure for model input
//!
//! One telemetry record for one machine. Values are already normalized
//! by the ingestion side; the engine never rewrites them.

use serde::{Deserialize, Serialize};
use super::layout::{FEATURE_COUNT, FEATURE_LAYOUT};

// ============================================================================
// MACHINE TYPE
// ============================================================================

/// Machine quality variant encoded by the `type_low`/`type_medium` one-hot pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineType {
    Low,
    Medium,
    High,
}

impl MachineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineType::Low => "L",
            MachineType::Medium => "M",
            MachineType::High => "H",
        }
    }

    pub fn quality_label(&self) -> &'static str {
        match self {
            MachineType::Low => "Low Quality",
            MachineType::Medium => "Medium Quality",
            MachineType::High => "High Quality",
        }
    }
}

impl std::fmt::Display for MachineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Immutable telemetry record fed to both stages.
///
/// `type_low` and `type_medium` must not both be set. That is checked by the
/// request validator before a vector ever reaches the engine; the engine
/// scores whatever it is given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub air_temperature: f64,
    pub process_temperature: f64,
    pub rotational_speed: f64,
    pub torque: f64,
    pub tool_wear: f64,
    pub type_low: bool,
    pub type_medium: bool,
}

impl FeatureVector {
    /// Model input row in FEATURE_LAYOUT order, booleans as 0.0 / 1.0
    pub fn to_model_input(&self) -> [f32; FEATURE_COUNT] {
        [
            self.air_temperature as f32,
            self.process_temperature as f32,
            self.rotational_speed as f32,
            self.torque as f32,
            self.tool_wear as f32,
            flag(self.type_low),
            flag(self.type_medium),
        ]
    }

    /// True when the one-hot machine type pair is well formed
    pub fn has_valid_type(&self) -> bool {
        !(self.type_low && self.type_medium)
    }

    /// Decoded machine type. Both flags set decodes as Low.
    pub fn machine_type(&self) -> MachineType {
        if self.type_low {
            MachineType::Low
        } else if self.type_medium {
            MachineType::Medium
        } else {
            MachineType::High
        }
    }

    /// JSON form with layout names, for log lines
    pub fn to_log_entry(&self) -> serde_json::Value {
        let row = self.to_model_input();
        let named: serde_json::Map<String, serde_json::Value> = FEATURE_LAYOUT
            .iter()
            .zip(row.iter())
            .map(|(name, value)| (name.to_string(), serde_json::json!(value)))
            .collect();
        serde_json::Value::Object(named)
    }
}

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}
