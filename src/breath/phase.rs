//! Breathing phases and the fixed three-phase plan.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::breath::tone::Cue;
use crate::config::{PhaseSettings, PhasesConfig};
use crate::error::BreathError;

/// Number of phases in one cycle.
pub const PHASE_COUNT: usize = 3;

/// The named segments of a breathing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    /// Breathe in.
    Inhale,
    /// Hold the breath.
    Hold,
    /// Breathe out.
    Exhale,
}

impl PhaseKind {
    /// All kinds in cycle order.
    pub const ALL: [Self; PHASE_COUNT] = [Self::Inhale, Self::Hold, Self::Exhale];

    /// Get display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Inhale => "Inhale",
            Self::Hold => "Hold",
            Self::Exhale => "Exhale",
        }
    }

    /// The tone cue played when this phase begins.
    #[must_use]
    pub const fn cue(self) -> Cue {
        match self {
            Self::Inhale => Cue::Inhale,
            Self::Hold => Cue::Hold,
            Self::Exhale => Cue::Exhale,
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// An opaque colour token handed to the presenter.
///
/// The core never interprets it; renderers decide what `#7dd3fc` or
/// `ring-active` look like.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorToken(String);

impl ColorToken {
    /// Token used for the idle ring between and outside phases.
    pub const BASELINE: &'static str = "ring-active";

    /// Wrap a token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The baseline ring colour.
    #[must_use]
    pub fn baseline() -> Self {
        Self::new(Self::BASELINE)
    }

    /// Whether this is the baseline token.
    #[must_use]
    pub fn is_baseline(&self) -> bool {
        self.0 == Self::BASELINE
    }

    /// Raw token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One phase of the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    /// Which segment this is.
    pub kind: PhaseKind,
    /// How long it lasts. Always non-zero.
    pub duration: Duration,
    /// Colour token for label and ring.
    pub color: ColorToken,
    /// Guidance text shown while the phase runs.
    pub hint: String,
}

impl Phase {
    fn from_settings(kind: PhaseKind, settings: &PhaseSettings) -> Result<Self, BreathError> {
        Ok(Self {
            kind,
            duration: seconds_to_duration(kind.display_name(), settings.seconds)?,
            color: ColorToken::new(settings.color.clone()),
            hint: settings.hint.clone(),
        })
    }
}

/// Phase durations given on the command line, e.g. `4-7-8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreathPattern {
    /// Inhale length.
    pub inhale: Duration,
    /// Hold length.
    pub hold: Duration,
    /// Exhale length.
    pub exhale: Duration,
}

impl FromStr for BreathPattern {
    type Err = BreathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BreathError::InvalidPattern(s.to_string());
        let parts: Vec<&str> = s.trim().split('-').collect();
        if parts.len() != PHASE_COUNT {
            return Err(invalid());
        }

        let mut durations = [Duration::ZERO; PHASE_COUNT];
        for (slot, part) in durations.iter_mut().zip(&parts) {
            let seconds: f64 = part.trim().parse().map_err(|_| invalid())?;
            *slot = Duration::try_from_secs_f64(seconds).map_err(|_| invalid())?;
            if slot.is_zero() {
                return Err(invalid());
            }
        }

        Ok(Self {
            inhale: durations[0],
            hold: durations[1],
            exhale: durations[2],
        })
    }
}

/// The ordered Inhale, Hold, Exhale sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhasePlan {
    phases: [Phase; PHASE_COUNT],
}

impl PhasePlan {
    /// Build a plan from the configured phases.
    ///
    /// # Errors
    ///
    /// Returns `BreathError::Config` if a phase length is not a positive,
    /// finite number of seconds.
    pub fn from_config(config: &PhasesConfig) -> Result<Self, BreathError> {
        Ok(Self {
            phases: [
                Phase::from_settings(PhaseKind::Inhale, &config.inhale)?,
                Phase::from_settings(PhaseKind::Hold, &config.hold)?,
                Phase::from_settings(PhaseKind::Exhale, &config.exhale)?,
            ],
        })
    }

    /// Replace the durations, keeping colours and hints.
    #[must_use]
    pub fn with_pattern(mut self, pattern: BreathPattern) -> Self {
        self.phases[0].duration = pattern.inhale;
        self.phases[1].duration = pattern.hold;
        self.phases[2].duration = pattern.exhale;
        self
    }

    /// Phase at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    /// Phases in order.
    pub fn iter(&self) -> impl Iterator<Item = &Phase> {
        self.phases.iter()
    }

    /// Length of one full cycle, not counting settle delays.
    #[must_use]
    pub fn cycle_duration(&self) -> Duration {
        self.phases.iter().map(|phase| phase.duration).sum()
    }
}

impl Default for PhasePlan {
    fn default() -> Self {
        let defaults = PhasesConfig::default();
        Self {
            phases: [
                default_phase(PhaseKind::Inhale, &defaults.inhale),
                default_phase(PhaseKind::Hold, &defaults.hold),
                default_phase(PhaseKind::Exhale, &defaults.exhale),
            ],
        }
    }
}

fn default_phase(kind: PhaseKind, settings: &PhaseSettings) -> Phase {
    Phase {
        kind,
        duration: Duration::from_secs_f64(settings.seconds),
        color: ColorToken::new(settings.color.clone()),
        hint: settings.hint.clone(),
    }
}

fn seconds_to_duration(name: &str, seconds: f64) -> Result<Duration, BreathError> {
    match Duration::try_from_secs_f64(seconds) {
        Ok(duration) if !duration.is_zero() => Ok(duration),
        _ => Err(BreathError::Config(format!(
            "{name} must last a positive number of seconds, got {seconds}"
        ))),
    }
}
