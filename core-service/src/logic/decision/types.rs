//! Decision Types
//!
//! Data structures produced by the decision policy. No logic beyond
//! formatting lives here.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// FAILURE CODES
// ============================================================================

/// Failure categories. The first four come from the stage-2 model,
/// `RNF` is synthesized by the policy when no category clears its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FailureCode {
    /// Heat dissipation failure
    HDF,
    /// Power failure
    PWF,
    /// Overstrain failure
    OSF,
    /// Tool wear failure
    TWF,
    /// Random / unclassified failure
    RNF,
}

impl FailureCode {
    /// Codes the stage-2 model scores, in default display order
    pub const MODEL_CODES: [FailureCode; 4] = [
        FailureCode::HDF,
        FailureCode::PWF,
        FailureCode::OSF,
        FailureCode::TWF,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCode::HDF => "HDF",
            FailureCode::PWF => "PWF",
            FailureCode::OSF => "OSF",
            FailureCode::TWF => "TWF",
            FailureCode::RNF => "RNF",
        }
    }

    /// False only for the synthetic fallback code
    pub fn is_model_code(&self) -> bool {
        !matches!(self, FailureCode::RNF)
    }
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FailureCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HDF" => Ok(FailureCode::HDF),
            "PWF" => Ok(FailureCode::PWF),
            "OSF" => Ok(FailureCode::OSF),
            "TWF" => Ok(FailureCode::TWF),
            "RNF" => Ok(FailureCode::RNF),
            other => Err(format!("unknown failure code: {}", other)),
        }
    }
}

// ============================================================================
// FAILURE TYPES
// ============================================================================

/// Ordered code → probability mapping. Order is the evaluation order of the
/// threshold config and is kept on the wire.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FailureTypes(Vec<(FailureCode, f64)>);

impl FailureTypes {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn push(&mut self, code: FailureCode, probability: f64) {
        self.0.push((code, probability));
    }

    pub fn get(&self, code: FailureCode) -> Option<f64> {
        self.0.iter().find(|(c, _)| *c == code).map(|(_, p)| *p)
    }

    pub fn contains(&self, code: FailureCode) -> bool {
        self.get(code).is_some()
    }

    pub fn codes(&self) -> Vec<FailureCode> {
        self.0.iter().map(|(c, _)| *c).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(FailureCode, f64)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for FailureTypes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (code, probability) in &self.0 {
            map.serialize_entry(code.as_str(), probability)?;
        }
        map.end()
    }
}

// ============================================================================
// VERDICT
// ============================================================================

/// Result of one decision.
///
/// `failure_probability` is the raw stage-1 output; it is rounded only when
/// serialized. Values inside `failure_types` are already rounded.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub failed: bool,
    pub failure_probability: f64,
    pub failure_types: Option<FailureTypes>,
}

impl Verdict {
    /// Placeholder for an item whose inference did not complete
    pub fn degraded() -> Self {
        Self {
            failed: false,
            failure_probability: 0.0,
            failure_types: None,
        }
    }

    pub fn healthy(failure_probability: f64) -> Self {
        Self {
            failed: false,
            failure_probability,
            failure_types: None,
        }
    }

    /// 0 / 1 flag as downstream consumers read it
    pub fn failure_flag(&self) -> u8 {
        u8::from(self.failed)
    }

    pub fn display_probability(&self) -> f64 {
        round3(self.failure_probability)
    }
}

#[derive(Serialize)]
struct VerdictWire<'a> {
    failure: u8,
    failure_probability: f64,
    failure_types: Option<&'a FailureTypes>,
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        VerdictWire {
            failure: self.failure_flag(),
            failure_probability: self.display_probability(),
            failure_types: self.failure_types.as_ref(),
        }
        .serialize(serializer)
    }
}

/// Round to 3 decimal digits for output.
///
/// Rounds the exact binary value: 0.0045 is stored just below the tie and
/// becomes 0.004.
pub fn round3(value: f64) -> f64 {
    format!("{:.3}", value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round3() {
        assert_eq!(round3(0.8564), 0.856);
        assert_eq!(round3(0.8565001), 0.857);
        assert_eq!(round3(0.0449999), 0.045);
        assert_eq!(round3(1.0), 1.0);
    }

    #[test]
    fn test_round3_uses_exact_binary_value() {
        assert_eq!(round3(0.0045), 0.004);
        assert_eq!(round3(0.0055), 0.005);
        assert_eq!(round3(0.0095), 0.009);
        assert_eq!(round3(0.0), 0.0);
    }

    #[test]
    fn test_failure_code_parse() {
        assert_eq!("TWF".parse::<FailureCode>(), Ok(FailureCode::TWF));
        assert!("XYZ".parse::<FailureCode>().is_err());
        assert!(!FailureCode::RNF.is_model_code());
        assert!(FailureCode::MODEL_CODES.iter().all(|c| c.is_model_code()));
    }

    #[test]
    fn test_verdict_wire_format() {
        let mut types = FailureTypes::new();
        types.push(FailureCode::TWF, 0.678);
        types.push(FailureCode::HDF, 0.892);

        let verdict = Verdict {
            failed: true,
            failure_probability: 0.85612,
            failure_types: Some(types),
        };

        let json = serde_json::to_string(&verdict).unwrap();
        assert_eq!(
            json,
            r#"{"failure":1,"failure_probability":0.856,"failure_types":{"TWF":0.678,"HDF":0.892}}"#
        );
    }

    #[test]
    fn test_degraded_wire_format() {
        let json = serde_json::to_value(Verdict::degraded()).unwrap();
        assert_eq!(json["failure"], 0);
        assert_eq!(json["failure_probability"], 0.0);
        assert!(json["failure_types"].is_null());
    }
}
