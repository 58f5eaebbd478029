use serde::Serialize;

use crate::error::BreathError;

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `BreathError::Json` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, BreathError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breath::{DriverTimings, PhasePlan, PlanReport};

    #[test]
    fn test_plan_to_json() {
        let report = PlanReport::new(&PhasePlan::default(), 2, &DriverTimings::default());
        let json = to_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["pattern"], "4-7-8");
        assert_eq!(value["target_cycles"], 2);
        assert_eq!(value["phases"][0]["kind"], "inhale");
        assert_eq!(value["phases"][2]["color"], "#c4b5fd");
        assert!((value["total_seconds"].as_f64().unwrap() - 39.3).abs() < 1e-9);
    }

    #[test]
    fn test_to_json_is_pretty() {
        let json = to_json(&serde_json::json!({ "a": 1 })).unwrap();
        assert!(json.contains('\n'));
    }
}
