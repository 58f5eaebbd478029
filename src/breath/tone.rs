//! Tone cues and the emitter that plays them.
//!
//! The emitter owns the process-wide sound switch and the lazily opened
//! audio backend. Nothing here can fail the session: a backend that cannot
//! be opened turns sound off for good, and a tone that cannot be played is
//! skipped.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::BreathError;

/// Oscillator wave shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveShape {
    /// Pure sine.
    Sine,
    /// Triangle, brighter than sine.
    Triangle,
    /// Square.
    Square,
    /// Rising sawtooth.
    Sawtooth,
}

impl WaveShape {
    /// Sample the shape at `phase` in cycles (`0.0..1.0` is one period).
    #[must_use]
    pub fn sample(self, phase: f32) -> f32 {
        let p = phase.rem_euclid(1.0);
        match self {
            Self::Sine => (std::f32::consts::TAU * p).sin(),
            Self::Triangle => {
                if p < 0.25 {
                    4.0 * p
                } else if p < 0.75 {
                    2.0 - 4.0 * p
                } else {
                    4.0 * p - 4.0
                }
            }
            Self::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Self::Sawtooth => 2.0 * p - 1.0,
        }
    }
}

/// One short synthesized pulse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToneSpec {
    /// Oscillator frequency.
    pub frequency_hz: f32,
    /// Time from onset until the envelope has decayed.
    pub duration: Duration,
    /// Oscillator shape.
    pub shape: WaveShape,
    /// Envelope peak, reached 10 ms after onset.
    pub peak_gain: f32,
    /// Silence before onset, for tones played in sequence.
    pub delay: Duration,
}

impl ToneSpec {
    /// A tone starting immediately.
    #[must_use]
    pub const fn new(frequency_hz: f32, duration: Duration, shape: WaveShape, peak_gain: f32) -> Self {
        Self {
            frequency_hz,
            duration,
            shape,
            peak_gain,
            delay: Duration::ZERO,
        }
    }

    /// The same tone, starting `delay` later.
    #[must_use]
    pub const fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

const PHASE_TONE: Duration = Duration::from_millis(120);
const CHIME_TONE: Duration = Duration::from_millis(180);

static INHALE_CUE: [ToneSpec; 1] = [ToneSpec::new(392.0, PHASE_TONE, WaveShape::Sine, 0.03)];
static HOLD_CUE: [ToneSpec; 1] = [ToneSpec::new(262.0, PHASE_TONE, WaveShape::Sine, 0.025)];
static EXHALE_CUE: [ToneSpec; 1] = [ToneSpec::new(220.0, PHASE_TONE, WaveShape::Sine, 0.03)];
static COMPLETION_CUE: [ToneSpec; 2] = [
    ToneSpec::new(660.0, CHIME_TONE, WaveShape::Triangle, 0.035),
    ToneSpec::new(880.0, CHIME_TONE, WaveShape::Triangle, 0.035).delayed(CHIME_TONE),
];

/// Named audio cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    /// Start of an inhale: low-mid tone.
    Inhale,
    /// Start of a hold: lower, quieter tone.
    Hold,
    /// Start of an exhale: low tone.
    Exhale,
    /// End of the session: two ascending bright tones, the second one
    /// delayed until the first has finished.
    Completion,
}

impl Cue {
    /// Tones making up this cue, in order.
    #[must_use]
    pub fn tones(self) -> &'static [ToneSpec] {
        match self {
            Self::Inhale => &INHALE_CUE,
            Self::Hold => &HOLD_CUE,
            Self::Exhale => &EXHALE_CUE,
            Self::Completion => &COMPLETION_CUE,
        }
    }
}

/// Something that can make a tone audible.
#[cfg_attr(test, mockall::automock)]
pub trait AudioBackend {
    /// Start playing `tone`. Must not block for the tone's duration.
    ///
    /// # Errors
    ///
    /// Returns `BreathError::Audio` if the tone could not be queued.
    fn play(&mut self, tone: &ToneSpec) -> Result<(), BreathError>;

    /// Short identifier for logs.
    fn name(&self) -> &'static str;
}

/// Opens the audio backend on first use.
pub type BackendInit = Box<dyn FnOnce() -> Result<Box<dyn AudioBackend>, BreathError>>;

/// Plays cues through a lazily opened backend, honouring the sound switch.
pub struct ToneEmitter {
    backend: Option<Box<dyn AudioBackend>>,
    init: Option<BackendInit>,
    sound_enabled: bool,
    unavailable: bool,
}

impl ToneEmitter {
    /// Create an emitter. The backend is not opened until
    /// [`ensure_ready`](Self::ensure_ready) or the first audible tone.
    #[must_use]
    pub fn new(init: BackendInit, sound_enabled: bool) -> Self {
        Self {
            backend: None,
            init: Some(init),
            sound_enabled,
            unavailable: false,
        }
    }

    /// Open the backend if that has not been attempted yet.
    ///
    /// Must be called from a user gesture. A failure disables sound for the
    /// rest of the process; there is no retry. Returns whether a backend is
    /// available.
    pub fn ensure_ready(&mut self) -> bool {
        if let Some(init) = self.init.take() {
            match init() {
                Ok(backend) => {
                    debug!(backend = backend.name(), "audio backend ready");
                    self.backend = Some(backend);
                }
                Err(err) => {
                    warn!(error = %err, "audio backend unavailable, sound disabled");
                    self.sound_enabled = false;
                    self.unavailable = true;
                }
            }
        }
        self.backend.is_some()
    }

    /// Play one tone. Silently does nothing when muted or without a
    /// backend; playback errors are logged and dropped.
    pub fn emit(&mut self, tone: &ToneSpec) {
        if !self.sound_enabled || !self.ensure_ready() {
            return;
        }
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        if let Err(err) = backend.play(tone) {
            debug!(error = %err, frequency_hz = tone.frequency_hz, "tone skipped");
        }
    }

    /// Play every tone of `cue`.
    pub fn play_cue(&mut self, cue: Cue) {
        for tone in cue.tones() {
            self.emit(tone);
        }
    }

    /// Switch sound on or off. Returns the effective setting, which stays
    /// off once the backend has failed.
    pub fn set_sound_enabled(&mut self, enabled: bool) -> bool {
        self.sound_enabled = enabled && !self.unavailable;
        self.sound_enabled
    }

    /// Flip the sound switch. Returns the effective setting.
    pub fn toggle_sound(&mut self) -> bool {
        self.set_sound_enabled(!self.sound_enabled)
    }

    /// Whether tones will be played.
    #[must_use]
    pub const fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    /// Whether the backend has been opened successfully.
    #[must_use]
    pub const fn audio_ready(&self) -> bool {
        self.backend.is_some()
    }

    /// Whether opening the backend has been attempted.
    #[must_use]
    pub const fn audio_requested(&self) -> bool {
        self.init.is_none()
    }

    /// Whether the backend failed and sound is off for good.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        self.unavailable
    }

    /// Name of the open backend.
    #[must_use]
    pub fn backend_name(&self) -> Option<&'static str> {
        self.backend.as_ref().map(|backend| backend.name())
    }
}

impl fmt::Debug for ToneEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToneEmitter")
            .field("backend", &self.backend_name())
            .field("sound_enabled", &self.sound_enabled)
            .field("audio_requested", &self.audio_requested())
            .field("unavailable", &self.unavailable)
            .finish()
    }
}
