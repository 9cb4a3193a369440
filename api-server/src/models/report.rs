//! Maintenance summary attached to single predictions

use serde::Serialize;

use failwatch_core::{MachineType, Verdict};

pub const STATUS_CRITICAL: &str = "CRITICAL - Failure Detected";
pub const STATUS_OPERATIONAL: &str = "Operational";

#[derive(Debug, Clone, Serialize)]
pub struct VehicleInfo {
    pub name: String,
    pub model: String,
    #[serde(rename = "type")]
    pub machine_type: String,
    pub quality: String,
    pub age_years: f64,
    pub total_km: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceReport {
    pub status: String,
    pub summary: String,
    pub failure_modes: Vec<String>,
    pub vehicle_info: VehicleInfo,
}

impl MaintenanceReport {
    /// Machines with neither type flag set are reported as `H`.
    pub fn build(verdict: &Verdict, machine_type: MachineType, vehicle: VehicleDetails<'_>) -> Self {
        let status = if verdict.failed { STATUS_CRITICAL } else { STATUS_OPERATIONAL };

        let failure_modes: Vec<String> = verdict
            .failure_types
            .iter()
            .flat_map(|types| types.iter())
            .filter(|(_, probability)| *probability > 0.0)
            .map(|(code, probability)| format!("{}: {:.1}% probability", code, probability * 100.0))
            .collect();

        let summary = if failure_modes.is_empty() {
            format!(
                "{}. Failure probability {:.1}%. No specific failure modes detected",
                status,
                verdict.display_probability() * 100.0
            )
        } else {
            format!(
                "{}. Failure probability {:.1}%. {} failure mode(s) detected",
                status,
                verdict.display_probability() * 100.0,
                failure_modes.len()
            )
        };

        Self {
            status: status.to_string(),
            summary,
            failure_modes,
            vehicle_info: VehicleInfo {
                name: vehicle.name.to_string(),
                model: vehicle.model.to_string(),
                machine_type: machine_type.as_str().to_string(),
                quality: machine_type.quality_label().to_string(),
                age_years: vehicle.age_years,
                total_km: vehicle.total_km,
            },
        }
    }
}

/// Borrowed vehicle metadata from the request
#[derive(Debug, Clone, Copy)]
pub struct VehicleDetails<'a> {
    pub name: &'a str,
    pub model: &'a str,
    pub age_years: f64,
    pub total_km: f64,
}
