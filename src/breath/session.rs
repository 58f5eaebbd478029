//! Session state.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::breath::phase::PhaseKind;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Not started, or reset by a configuration change.
    #[default]
    Idle,
    /// Phases are advancing.
    Running,
    /// Frozen mid-phase.
    Paused,
    /// All target cycles completed.
    Finished,
}

impl SessionStatus {
    /// Whether a trigger starts a fresh session from this state.
    #[must_use]
    pub const fn can_start(self) -> bool {
        matches!(self, Self::Idle | Self::Finished)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Mutable state of the one session a controller drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub status: SessionStatus,
    /// Index into the phase plan; `None` before the first phase.
    pub current_phase: Option<usize>,
    /// Full cycles completed in this session.
    pub cycle_count: u32,
    /// Cycles to run before finishing. At least one.
    pub target_cycles: u32,
    /// Time spent in the current phase, frozen while paused.
    pub elapsed_phase: Duration,
    /// Clock reading the current phase's elapsed time is measured from.
    pub phase_started_at: Duration,
}

impl SessionState {
    /// A fresh idle session.
    #[must_use]
    pub fn new(target_cycles: u32) -> Self {
        Self {
            status: SessionStatus::Idle,
            current_phase: None,
            cycle_count: 0,
            target_cycles: target_cycles.max(1),
            elapsed_phase: Duration::ZERO,
            phase_started_at: Duration::ZERO,
        }
    }

    /// Shorthand for `status == Running`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }
}

/// A read-only, serializable view of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub phase: Option<PhaseKind>,
    pub phase_index: Option<usize>,
    pub cycle_count: u32,
    pub target_cycles: u32,
    /// Elapsed time in the current phase, in milliseconds.
    pub elapsed_ms: u64,
    pub sound_enabled: bool,
    pub audio_ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let state = SessionState::new(3);
        assert_eq!(state.status, SessionStatus::Idle);
        assert_eq!(state.current_phase, None);
        assert_eq!(state.cycle_count, 0);
        assert_eq!(state.target_cycles, 3);
        assert!(!state.is_running());
    }

    #[test]
    fn test_target_cycles_at_least_one() {
        assert_eq!(SessionState::new(0).target_cycles, 1);
    }

    #[test]
    fn test_can_start() {
        assert!(SessionStatus::Idle.can_start());
        assert!(SessionStatus::Finished.can_start());
        assert!(!SessionStatus::Running.can_start());
        assert!(!SessionStatus::Paused.can_start());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Finished).unwrap(),
            "\"finished\""
        );
        assert_eq!(SessionStatus::Paused.to_string(), "paused");
    }
}
