//! Mapping from phase progress to ring and orb visuals.

use std::time::Duration;

use serde::Serialize;

use crate::breath::phase::{ColorToken, PhaseKind};

/// Orb scale at the start of an inhale and the end of an exhale.
pub const SCALE_MIN: f64 = 0.8;
/// Orb scale at the top of the breath.
pub const SCALE_MAX: f64 = 1.15;

/// Renderer policy for variant details that do not affect timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderPolicy {
    /// Draw the Hold ring as a flat, steady fill.
    pub flat_hold_fill: bool,
    /// Flash the ring briefly when a phase starts.
    pub flash_on_phase: bool,
}

/// Ring state handed to the presenter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingFill {
    /// Filled fraction in `0.0..=1.0`.
    pub fraction: f64,
    /// Colour of the filled arc.
    pub color: ColorToken,
    /// The ring is being held (Hold phase with flat fill enabled).
    pub held: bool,
}

/// Everything that changes on a progress tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualFrame {
    /// Ring progress.
    pub ring: RingFill,
    /// Orb scale factor.
    pub orb_scale: f64,
}

impl VisualFrame {
    /// The pre-session look: empty ring, smallest orb.
    #[must_use]
    pub fn baseline() -> Self {
        Self {
            ring: RingFill {
                fraction: 0.0,
                color: ColorToken::baseline(),
                held: false,
            },
            orb_scale: SCALE_MIN,
        }
    }
}

/// Map a phase and its progress to ring fill and orb scale.
///
/// `progress` is clamped to `0.0..=1.0`.
#[must_use]
pub fn frame_for(
    kind: PhaseKind,
    progress: f64,
    color: &ColorToken,
    policy: RenderPolicy,
) -> VisualFrame {
    let progress = progress.clamp(0.0, 1.0);
    let span = SCALE_MAX - SCALE_MIN;

    let (fraction, orb_scale) = match kind {
        PhaseKind::Inhale => (progress, SCALE_MIN + span * progress),
        PhaseKind::Hold => (1.0, SCALE_MAX),
        PhaseKind::Exhale => (1.0 - progress, SCALE_MAX - span * progress),
    };

    VisualFrame {
        ring: RingFill {
            fraction,
            color: color.clone(),
            held: kind == PhaseKind::Hold && policy.flat_hold_fill,
        },
        orb_scale,
    }
}

/// Fraction of `duration` covered by `elapsed`, clamped to `0.0..=1.0`.
#[must_use]
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

/// Whole seconds left, rounded up, never negative.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn remaining_whole_seconds(elapsed: Duration, duration: Duration) -> u32 {
    let remaining = duration.saturating_sub(elapsed);
    let millis = remaining.as_millis();
    let seconds = millis.div_ceil(1_000);
    seconds.min(u128::from(u32::MAX)) as u32
}
