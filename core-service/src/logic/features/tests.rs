//! Feature vector encoding tests

#[cfg(test)]
mod vector_tests {
    use crate::logic::features::{FeatureVector, MachineType, FEATURE_COUNT};

    fn sample(type_low: bool, type_medium: bool) -> FeatureVector {
        FeatureVector {
            air_temperature: -5.0,
            process_temperature: 150.0,
            rotational_speed: 5000.0,
            torque: 80.0,
            tool_wear: 300.0,
            type_low,
            type_medium,
        }
    }

    #[test]
    fn test_model_input_order() {
        let row = sample(true, false).to_model_input();

        assert_eq!(row.len(), FEATURE_COUNT);
        assert_eq!(row[0], -5.0);
        assert_eq!(row[1], 150.0);
        assert_eq!(row[2], 5000.0);
        assert_eq!(row[3], 80.0);
        assert_eq!(row[4], 300.0);
        assert_eq!(row[5], 1.0);
        assert_eq!(row[6], 0.0);
    }

    #[test]
    fn test_machine_type_decoding() {
        assert_eq!(sample(true, false).machine_type(), MachineType::Low);
        assert_eq!(sample(false, true).machine_type(), MachineType::Medium);
        assert_eq!(sample(false, false).machine_type(), MachineType::High);
        assert_eq!(MachineType::Medium.quality_label(), "Medium Quality");
    }

    #[test]
    fn test_type_exclusivity() {
        assert!(sample(true, false).has_valid_type());
        assert!(sample(false, false).has_valid_type());
        assert!(!sample(true, true).has_valid_type());
    }

    #[test]
    fn test_log_entry_uses_layout_names() {
        let entry = sample(false, true).to_log_entry();
        assert_eq!(entry["rotational_speed"], 5000.0);
        assert_eq!(entry["type_low"], 0.0);
    }
}
