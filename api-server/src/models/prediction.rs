//! Prediction request/response models

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use failwatch_core::{FeatureVector, Verdict};
use super::report::MaintenanceReport;

/// Telemetry fields of one machine.
///
/// Accepts both snake_case and the dashboard's PascalCase keys.
/// `type_medium` defaults to the opposite of `type_low`, so a bare
/// `{"Type_L": true}` is a low machine and an empty pair is medium.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_machine_type"))]
pub struct MachineFeatures {
    #[serde(alias = "Air_temperature")]
    pub air_temperature: f64,

    #[serde(alias = "Process_temperature")]
    pub process_temperature: f64,

    #[serde(alias = "Rotational_speed")]
    #[validate(range(min = 0.0))]
    pub rotational_speed: f64,

    #[serde(alias = "Torque")]
    #[validate(range(min = 0.0))]
    pub torque: f64,

    #[serde(alias = "Tool_wear")]
    #[validate(range(min = 0.0))]
    pub tool_wear: f64,

    #[serde(alias = "Type_L", default)]
    pub type_low: bool,

    #[serde(alias = "Type_M", default)]
    pub type_medium: Option<bool>,
}

impl MachineFeatures {
    pub fn type_medium(&self) -> bool {
        self.type_medium.unwrap_or(!self.type_low)
    }

    pub fn to_feature_vector(&self) -> FeatureVector {
        FeatureVector {
            air_temperature: self.air_temperature,
            process_temperature: self.process_temperature,
            rotational_speed: self.rotational_speed,
            torque: self.torque,
            tool_wear: self.tool_wear,
            type_low: self.type_low,
            type_medium: self.type_medium(),
        }
    }
}

/// Low and medium are mutually exclusive
fn validate_machine_type(features: &MachineFeatures) -> Result<(), ValidationError> {
    if !features.to_feature_vector().has_valid_type() {
        let mut err = ValidationError::new("machine_type");
        err.message = Some("type_low and type_medium cannot both be true".into());
        return Err(err);
    }
    Ok(())
}

/// Single prediction request: telemetry plus optional vehicle metadata
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PredictRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub features: MachineFeatures,

    #[serde(default = "unknown")]
    pub vehicle_name: String,

    #[serde(default = "unknown")]
    pub model: String,

    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub machine_age: f64,

    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub total_kilometers: f64,
}

fn unknown() -> String {
    "Unknown".to_string()
}

/// Verdict fields plus the maintenance summary
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub verdict: Verdict,
    pub maintenance_report: MaintenanceReport,
}
