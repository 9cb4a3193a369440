//! Decision Policy
//!
//! Turns stage probabilities into a `Verdict`.
//! Input: FeatureVector, both stages, ThresholdConfig
//! Output: Verdict

use crate::logic::features::FeatureVector;
use crate::logic::model::{ClassScores, FailureClassifier, FailureDetector, InferenceError, ThresholdConfig};
use super::types::{round3, FailureCode, FailureTypes, Verdict};

// ============================================================================
// MAIN DECISION FUNCTION
// ============================================================================

/// Run the two-stage pipeline for one vector.
///
/// Stage-2 is only called once stage-1 reaches `stage1_threshold`.
pub fn decide(
    features: &FeatureVector,
    detector: &dyn FailureDetector,
    classifier: &dyn FailureClassifier,
    config: &ThresholdConfig,
) -> Result<Verdict, InferenceError> {
    let p_fail = detector.predict_probability(features)?;

    if !stage1_fires(p_fail, config) {
        return Ok(Verdict::healthy(p_fail));
    }

    let scores = classifier.predict_probabilities(features)?;
    decide_with_scores(p_fail, Some(&scores), config)
}

/// Decision from already computed probabilities.
///
/// `scores` is ignored when stage-1 does not fire. When it does fire the
/// scores are required, and every configured code must be present.
pub fn decide_with_scores(
    p_fail: f64,
    scores: Option<&ClassScores>,
    config: &ThresholdConfig,
) -> Result<Verdict, InferenceError> {
    if !stage1_fires(p_fail, config) {
        return Ok(Verdict::healthy(p_fail));
    }

    let scores = scores.ok_or_else(|| InferenceError::classifier("no stage-2 scores for a failing vector"))?;

    Ok(Verdict {
        failed: true,
        failure_probability: p_fail,
        failure_types: Some(select_failure_types(p_fail, scores, config)?),
    })
}

/// Stage-1 gate, inclusive at the threshold
pub fn stage1_fires(p_fail: f64, config: &ThresholdConfig) -> bool {
    p_fail >= config.stage1_threshold()
}

/// Codes whose score reaches their threshold, in config order.
/// Falls back to a lone `RNF` carrying the stage-1 probability.
pub fn select_failure_types(
    p_fail: f64,
    scores: &ClassScores,
    config: &ThresholdConfig,
) -> Result<FailureTypes, InferenceError> {
    let mut failure_types = FailureTypes::new();

    for code in config.failure_codes() {
        let probability = *scores
            .get(code)
            .ok_or_else(|| InferenceError::classifier(format!("no score for {}", code)))?;

        // Config construction guarantees a threshold for every listed code
        let threshold = config.threshold_for(*code).unwrap_or(f64::INFINITY);

        // Compare unrounded, report rounded
        if probability >= threshold {
            failure_types.push(*code, round3(probability));
        }
    }

    if failure_types.is_empty() {
        failure_types.push(FailureCode::RNF, round3(p_fail));
    }

    Ok(failure_types)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config() -> ThresholdConfig {
        let thresholds: HashMap<FailureCode, f64> = [
            (FailureCode::HDF, 0.6),
            (FailureCode::PWF, 0.65),
            (FailureCode::OSF, 0.7),
            (FailureCode::TWF, 0.55),
        ]
        .into_iter()
        .collect();
        ThresholdConfig::new(0.5, thresholds, FailureCode::MODEL_CODES.to_vec()).unwrap()
    }

    fn scores(hdf: f64, pwf: f64, osf: f64, twf: f64) -> ClassScores {
        [
            (FailureCode::HDF, hdf),
            (FailureCode::PWF, pwf),
            (FailureCode::OSF, osf),
            (FailureCode::TWF, twf),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_below_gate_has_no_types() {
        let verdict = decide_with_scores(0.045, None, &config()).unwrap();
        assert!(!verdict.failed);
        assert_eq!(verdict.failure_probability, 0.045);
        assert!(verdict.failure_types.is_none());
    }

    #[test]
    fn test_gate_is_inclusive() {
        let verdict = decide_with_scores(0.5, Some(&scores(0.0, 0.0, 0.0, 0.0)), &config()).unwrap();
        assert!(verdict.failed);
    }

    #[test]
    fn test_inclusion_is_threshold_inclusive() {
        let types = select_failure_types(0.9, &scores(0.6, 0.649, 0.7, 0.5), &config()).unwrap();
        assert_eq!(types.codes(), vec![FailureCode::HDF, FailureCode::OSF]);
    }

    #[test]
    fn test_rounding_happens_after_comparison() {
        // 0.6496 rounds to 0.65 but is below the 0.65 PWF threshold
        let types = select_failure_types(0.9, &scores(0.0, 0.6496, 0.0, 0.0), &config()).unwrap();
        assert!(!types.contains(FailureCode::PWF));

        // 0.5502 clears 0.55 and is reported as 0.55
        let types = select_failure_types(0.9, &scores(0.0, 0.0, 0.0, 0.5502), &config()).unwrap();
        assert_eq!(types.get(FailureCode::TWF), Some(0.55));
    }

    #[test]
    fn test_fallback_uses_stage1_probability() {
        let types = select_failure_types(0.85649, &scores(0.1, 0.1, 0.1, 0.1), &config()).unwrap();
        assert_eq!(types.codes(), vec![FailureCode::RNF]);
        assert_eq!(types.get(FailureCode::RNF), Some(0.856));
    }

    #[test]
    fn test_rnf_never_mixes_with_real_codes() {
        let types = select_failure_types(0.9, &scores(0.99, 0.0, 0.0, 0.0), &config()).unwrap();
        assert!(!types.contains(FailureCode::RNF));
        assert_eq!(types.len(), 1);
    }

    #[test]
    fn test_all_codes_can_co_occur() {
        let types = select_failure_types(0.9, &scores(0.9, 0.9, 0.9, 0.9), &config()).unwrap();
        assert_eq!(types.codes(), FailureCode::MODEL_CODES.to_vec());
    }

    #[test]
    fn test_missing_score_is_inference_error() {
        let mut partial = scores(0.9, 0.9, 0.9, 0.9);
        partial.remove(&FailureCode::OSF);

        let err = select_failure_types(0.9, &partial, &config()).unwrap_err();
        assert!(err.message.contains("OSF"));
    }

    #[test]
    fn test_failing_without_scores_is_error() {
        assert!(decide_with_scores(0.9, None, &config()).is_err());
    }
}
