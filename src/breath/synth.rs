//! Sample-level synthesis for tones.
//!
//! Used by the audio device callback. Everything here is allocation-free
//! per sample and independent of any audio API.

use std::time::Duration;

use crate::breath::tone::ToneSpec;

/// Attack time of the envelope.
pub const ATTACK: Duration = Duration::from_millis(10);
/// Level the envelope decays to.
pub const FLOOR_GAIN: f32 = 0.0001;
/// How long a voice keeps running after its envelope ends.
pub const RELEASE_TAIL: Duration = Duration::from_millis(20);

/// Envelope gain `t` seconds after onset.
///
/// Linear ramp to the peak over [`ATTACK`], then exponential decay to
/// [`FLOOR_GAIN`] at the tone's duration, then held at the floor.
#[must_use]
pub fn amplitude_at(tone: &ToneSpec, t: f32) -> f32 {
    if t < 0.0 {
        return 0.0;
    }
    let attack = ATTACK.as_secs_f32();
    let duration = tone.duration.as_secs_f32().max(attack);
    let peak = tone.peak_gain.max(FLOOR_GAIN);

    if t < attack {
        return peak * t / attack;
    }
    if t >= duration || duration <= attack {
        return FLOOR_GAIN.min(peak);
    }
    let fraction = (t - attack) / (duration - attack);
    peak * (FLOOR_GAIN / peak).powf(fraction)
}

/// One tone being rendered.
#[derive(Debug, Clone)]
pub struct ToneVoice {
    tone: ToneSpec,
    sample_rate: f32,
    position: u64,
    phase: f32,
}

impl ToneVoice {
    /// Start rendering `tone` at `sample_rate` Hz.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(tone: ToneSpec, sample_rate: u32) -> Self {
        Self {
            tone,
            sample_rate: sample_rate.max(1) as f32,
            position: 0,
            phase: 0.0,
        }
    }

    /// Produce the next mono sample.
    #[allow(clippy::cast_precision_loss)]
    pub fn next_sample(&mut self) -> f32 {
        let t = self.position as f32 / self.sample_rate - self.tone.delay.as_secs_f32();
        self.position += 1;
        if t < 0.0 || self.is_finished() {
            return 0.0;
        }
        let sample = self.tone.shape.sample(self.phase) * amplitude_at(&self.tone, t);
        self.phase = (self.phase + self.tone.frequency_hz / self.sample_rate).fract();
        sample
    }

    /// Whether the voice has passed its release tail.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn is_finished(&self) -> bool {
        let end = self.tone.delay + self.tone.duration + RELEASE_TAIL;
        self.position as f32 / self.sample_rate >= end.as_secs_f32()
    }
}

/// Sums active voices into an interleaved output buffer.
#[derive(Debug, Default)]
pub struct Mixer {
    voices: Vec<ToneVoice>,
}

impl Mixer {
    /// Create an empty mixer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a voice.
    pub fn push(&mut self, voice: ToneVoice) {
        self.voices.push(voice);
    }

    /// Number of voices still sounding.
    #[must_use]
    pub fn active(&self) -> usize {
        self.voices.len()
    }

    /// Fill `out` with `channels` interleaved channels. The same mono mix
    /// goes to every channel. Finished voices are dropped afterwards.
    pub fn fill(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for frame in out.chunks_mut(channels) {
            let mixed: f32 = self.voices.iter_mut().map(ToneVoice::next_sample).sum();
            frame.fill(mixed.clamp(-1.0, 1.0));
        }
        self.voices.retain(|voice| !voice.is_finished());
    }
}
