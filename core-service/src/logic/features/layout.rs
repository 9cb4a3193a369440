//! Feature Layout
//!
//! Column order of the model input row. Both stage models are exported
//! against this order, and a model whose declared input width disagrees is
//! refused at load time instead of failing on its first prediction.

use serde::{Deserialize, Serialize};

/// Model input columns, in tensor order
pub const FEATURE_LAYOUT: &[&str] = &[
    "air_temperature",       // 0: ambient air temperature
    "process_temperature",   // 1: process temperature
    "rotational_speed",      // 2: spindle speed (rpm)
    "torque",                // 3: torque (Nm)
    "tool_wear",             // 4: accumulated tool wear (min)
    "type_low",              // 5: one-hot L, H is implied when 5 and 6 are 0
    "type_medium",           // 6: one-hot M
];

pub const FEATURE_COUNT: usize = FEATURE_LAYOUT.len();

/// Declared model input shape that cannot take one layout row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMismatch {
    pub declared: Vec<i64>,
}

impl std::fmt::Display for LayoutMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "model input shape {:?} does not take {} features",
            self.declared, FEATURE_COUNT
        )
    }
}

/// Check a declared input shape against the layout.
///
/// Accepts `[batch, FEATURE_COUNT]` with a fixed or dynamic (negative) batch
/// axis. A dynamic feature axis is accepted too; the row width is then only
/// checked by the runtime.
pub fn check_input_shape(declared: &[i64]) -> Result<(), LayoutMismatch> {
    let fits = match declared {
        [batch, width] => {
            *batch != 0 && (*width < 0 || *width as usize == FEATURE_COUNT)
        }
        _ => false,
    };

    if fits {
        Ok(())
    } else {
        Err(LayoutMismatch { declared: declared.to_vec() })
    }
}

/// Layout summary for status output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}
