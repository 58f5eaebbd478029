//! The `plan` command.

use crate::breath::{DriverTimings, PlanReport};
use crate::cli::args::{OutputFormat, SessionArgs};
use crate::cli::commands::session_plan;
use crate::config::Config;
use crate::error::BreathError;
use crate::output::format_plan;

/// Describe the session the current settings would run.
///
/// # Errors
///
/// Returns an error if the configured phases are invalid or output
/// formatting fails.
pub fn plan(config: &Config, args: &SessionArgs, format: OutputFormat) -> Result<String, BreathError> {
    let (plan, target) = session_plan(config, args)?;
    let report = PlanReport::new(&plan, target, &DriverTimings::from_config(&config.session));
    format_plan(&report, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breath::BreathPattern;

    #[test]
    fn test_plan_json() {
        let args = SessionArgs {
            cycles: Some(3),
            pattern: Some("4-4-4".parse::<BreathPattern>().unwrap()),
        };
        let output = plan(&Config::default(), &args, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["pattern"], "4-4-4");
        assert_eq!(value["target_cycles"], 3);
        assert_eq!(value["phases"].as_array().unwrap().len(), 3);
        assert_eq!(value["phases"][1]["kind"], "hold");
        // 3 * (12 s + 3 * 50 ms) + 2 * 1 s
        let total = value["total_seconds"].as_f64().unwrap();
        assert!((total - 38.45).abs() < 1e-9);
    }

    #[test]
    fn test_plan_pretty() {
        let output = plan(&Config::default(), &SessionArgs::default(), OutputFormat::Pretty).unwrap();
        assert!(output.contains("4-7-8"));
        assert!(output.contains("Exhale"));
    }
}
