//! Guided breathing: phases, the session state machine, visuals and tones.

pub mod audio;
mod controller;
mod phase;
mod presenter;
mod report;
mod session;
pub mod synth;
mod tone;
mod visual;

pub use audio::{open_backend, BackendKind, BellBackend};
pub use controller::{DriverTimings, SessionController, CYCLE_GAP, SETTLE_DELAY};
pub use phase::{BreathPattern, ColorToken, Phase, PhaseKind, PhasePlan, PHASE_COUNT};
pub use presenter::{hex_rgb, Banner, LinePresenter, Presenter, ViewModel};
pub use report::{pattern_label, session_length, PhaseLine, PlanReport, SessionSummary};
pub use session::{SessionSnapshot, SessionState, SessionStatus};
pub use tone::{AudioBackend, BackendInit, Cue, ToneEmitter, ToneSpec, WaveShape};
pub use visual::{
    frame_for, progress, remaining_whole_seconds, RenderPolicy, RingFill, VisualFrame, SCALE_MAX,
    SCALE_MIN,
};
