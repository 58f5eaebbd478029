//! Plain data describing a plan or a finished session, for output.

use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::breath::controller::DriverTimings;
use crate::breath::phase::{PhaseKind, PhasePlan};

/// One phase row of a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseLine {
    pub kind: PhaseKind,
    pub seconds: f64,
    pub color: String,
    pub hint: String,
}

/// What a session with the current settings will look like.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanReport {
    pub phases: Vec<PhaseLine>,
    /// Pattern in `inhale-hold-exhale` seconds, e.g. `4-7-8`.
    pub pattern: String,
    pub target_cycles: u32,
    /// One cycle, phases only.
    pub cycle_seconds: f64,
    /// Whole session including settle delays and gaps between cycles.
    pub total_seconds: f64,
}

impl PlanReport {
    /// Describe `plan` run for `target_cycles` cycles.
    #[must_use]
    pub fn new(plan: &PhasePlan, target_cycles: u32, timings: &DriverTimings) -> Self {
        let target_cycles = target_cycles.max(1);
        let phases = plan
            .iter()
            .map(|phase| PhaseLine {
                kind: phase.kind,
                seconds: phase.duration.as_secs_f64(),
                color: phase.color.to_string(),
                hint: phase.hint.clone(),
            })
            .collect();
        Self {
            phases,
            pattern: pattern_label(plan),
            target_cycles,
            cycle_seconds: plan.cycle_duration().as_secs_f64(),
            total_seconds: session_length(plan, target_cycles, timings).as_secs_f64(),
        }
    }
}

/// Wall-clock length of a full session: every phase is followed by a
/// settle delay, and cycles are separated by the gap.
#[must_use]
pub fn session_length(plan: &PhasePlan, target_cycles: u32, timings: &DriverTimings) -> Duration {
    let cycles = target_cycles.max(1);
    let settles = u32::try_from(plan.iter().count()).unwrap_or(u32::MAX);
    let per_cycle = plan.cycle_duration() + timings.settle * settles;
    per_cycle * cycles + timings.cycle_gap * (cycles - 1)
}

/// `4-7-8` style label, trimming needless decimals.
#[must_use]
pub fn pattern_label(plan: &PhasePlan) -> String {
    plan.iter()
        .map(|phase| {
            let seconds = phase.duration.as_secs_f64();
            if phase.duration.subsec_nanos() == 0 {
                format!("{}", phase.duration.as_secs())
            } else {
                format!("{seconds}")
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Outcome of a headless run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub pattern: String,
    pub cycles_completed: u32,
    pub target_cycles: u32,
    pub sound_enabled: bool,
    /// Audio backend in use, if one opened.
    pub backend: Option<String>,
}

impl SessionSummary {
    /// Elapsed wall-clock time.
    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_report_defaults() {
        let report = PlanReport::new(&PhasePlan::default(), 1, &DriverTimings::default());
        assert_eq!(report.pattern, "4-7-8");
        assert_eq!(report.phases.len(), 3);
        assert_eq!(report.phases[1].kind, PhaseKind::Hold);
        assert!((report.cycle_seconds - 19.0).abs() < 1e-9);
        assert!((report.total_seconds - 19.15).abs() < 1e-9);
    }

    #[test]
    fn test_session_length_counts_gaps() {
        let timings = DriverTimings::default();
        let length = session_length(&PhasePlan::default(), 4, &timings);
        // 4 * (19 s + 150 ms) + 3 * 1 s
        assert_eq!(length, Duration::from_millis(4 * 19_150 + 3_000));
    }

    #[test]
    fn test_pattern_label_fractional() {
        let plan = PhasePlan::default().with_pattern("0.5-2-1.25".parse().unwrap());
        assert_eq!(pattern_label(&plan), "0.5-2-1.25");
    }
}
