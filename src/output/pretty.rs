use colored::Colorize;

use crate::breath::{hex_rgb, ColorToken, PlanReport, SessionSummary};
use crate::config::Config;

/// Format a duration as `MM:SS`.
#[must_use]
pub fn format_duration_mmss(d: chrono::Duration) -> String {
    let total_seconds = d.num_seconds().abs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

/// Format a duration as a human-readable string.
#[must_use]
pub fn format_duration(d: chrono::Duration) -> String {
    let total_seconds = d.num_seconds();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;

    let plural = |n: i64| if n == 1 { "" } else { "s" };
    match (minutes, seconds) {
        (0, s) => format!("{s} second{}", plural(s)),
        (m, 0) => format!("{m} minute{}", plural(m)),
        (m, s) => format!("{m} minute{}, {s} second{}", plural(m), plural(s)),
    }
}

fn seconds_to_chrono(seconds: f64) -> chrono::Duration {
    #[allow(clippy::cast_possible_truncation)]
    let millis = (seconds * 1_000.0).round() as i64;
    chrono::Duration::milliseconds(millis)
}

fn paint(text: &str, color: &str) -> String {
    match hex_rgb(&ColorToken::new(color)) {
        Some((r, g, b)) => text.truecolor(r, g, b).bold().to_string(),
        None => text.bold().to_string(),
    }
}

/// Format a plan as a phase table plus totals.
#[must_use]
pub fn format_plan_pretty(plan: &PlanReport) -> String {
    let mut output = format!("Breathing plan {}\n", plan.pattern.bold());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for phase in &plan.phases {
        let name = format!("{:<7}", phase.kind.display_name());
        output.push_str(&format!(
            "{} {:>6}  {}\n",
            paint(&name, &phase.color),
            format!("{}s", phase.seconds),
            phase.hint.dimmed()
        ));
    }

    output.push_str(&"─".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  {}: {}\n",
        "Cycle".dimmed(),
        format_duration(seconds_to_chrono(plan.cycle_seconds))
    ));
    output.push_str(&format!("  {}: {}\n", "Cycles".dimmed(), plan.target_cycles));
    output.push_str(&format!(
        "  {}: {} ({})",
        "Session".dimmed(),
        format_duration(seconds_to_chrono(plan.total_seconds)),
        format_duration_mmss(seconds_to_chrono(plan.total_seconds))
    ));

    output
}

/// Format the summary printed after a headless session.
#[must_use]
pub fn format_summary_pretty(summary: &SessionSummary) -> String {
    let mut output = format!(
        "{} {} of {}\n",
        "✓ Session complete:".green().bold(),
        summary.cycles_completed,
        summary.pattern.bold()
    );
    output.push_str(&format!(
        "  {}: {}\n",
        "Started".dimmed(),
        summary.started_at.format("%Y-%m-%d %H:%M:%S")
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Duration".dimmed(),
        format_duration_mmss(summary.duration())
    ));
    output.push_str(&format!(
        "  {}: {}/{}\n",
        "Cycles".dimmed(),
        summary.cycles_completed,
        summary.target_cycles
    ));
    let sound = match (&summary.backend, summary.sound_enabled) {
        (Some(backend), true) => format!("on ({backend})"),
        _ => "off".to_string(),
    };
    output.push_str(&format!("  {}: {}", "Sound".dimmed(), sound));
    output
}

/// Format the effective configuration as annotated YAML.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized.
pub fn format_config_pretty(config: &Config, source: &str) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(config)?;
    Ok(format!("{}\n{}", format!("# {source}").dimmed(), yaml.trim_end()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breath::{DriverTimings, PhasePlan};
    use chrono::{Local, TimeZone};

    fn summary(sound_enabled: bool, backend: Option<&str>) -> SessionSummary {
        let started_at = Local.with_ymd_and_hms(2026, 3, 14, 7, 30, 0).unwrap();
        SessionSummary {
            started_at,
            finished_at: started_at + chrono::Duration::seconds(80),
            pattern: "4-7-8".to_string(),
            cycles_completed: 4,
            target_cycles: 4,
            sound_enabled,
            backend: backend.map(str::to_string),
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(chrono::Duration::seconds(1)), "1 second");
        assert_eq!(format_duration(chrono::Duration::seconds(19)), "19 seconds");
        assert_eq!(format_duration(chrono::Duration::seconds(60)), "1 minute");
        assert_eq!(
            format_duration(chrono::Duration::seconds(79)),
            "1 minute, 19 seconds"
        );
        assert_eq!(format_duration(chrono::Duration::seconds(125)), "2 minutes, 5 seconds");
    }

    #[test]
    fn test_format_duration_mmss() {
        assert_eq!(format_duration_mmss(chrono::Duration::seconds(0)), "00:00");
        assert_eq!(format_duration_mmss(chrono::Duration::seconds(79)), "01:19");
        assert_eq!(format_duration_mmss(chrono::Duration::seconds(-5)), "00:05");
    }

    #[test]
    fn test_format_plan_pretty() {
        let report = PlanReport::new(&PhasePlan::default(), 4, &DriverTimings::default());
        let output = format_plan_pretty(&report);

        assert!(output.contains("Breathing plan"));
        assert!(output.contains("4-7-8"));
        assert!(output.contains("Inhale"));
        assert!(output.contains("Hold"));
        assert!(output.contains("Exhale"));
        assert!(output.contains("Rest softly, shoulders relaxed"));
        assert!(output.contains("19 seconds"));
        // 4 * 19.15 s + 3 s
        assert!(output.contains("1 minute, 19 seconds"));
        assert!(output.contains("01:19"));
    }

    #[test]
    fn test_format_summary_pretty() {
        let output = format_summary_pretty(&summary(true, Some("bell")));
        assert!(output.contains("Session complete"));
        assert!(output.contains("2026-03-14 07:30:00"));
        assert!(output.contains("01:20"));
        assert!(output.contains("4/4"));
        assert!(output.contains("on (bell)"));

        let muted = format_summary_pretty(&summary(false, Some("bell")));
        assert!(muted.contains("Sound"));
        assert!(muted.ends_with("off"));
    }

    #[test]
    fn test_format_config_pretty() {
        let output = format_config_pretty(&Config::default(), "defaults").unwrap();
        assert!(output.contains("defaults"));
        assert!(output.contains("target_cycles: 4"));
        assert!(output.contains("flat_hold_fill: true"));
    }
}
