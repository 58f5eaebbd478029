//! Concrete audio backends.

use std::io::Write;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::breath::tone::{AudioBackend, BackendInit, ToneSpec};
use crate::error::BreathError;

/// Which backend plays tones.
///
/// The default is `system` when built with the `audio` feature and `bell`
/// otherwise, so a default configuration always has a backend that opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Synthesized tones on the default output device.
    System,
    /// The terminal bell, once per tone.
    Bell,
    /// No audio at all.
    Off,
}

impl Default for BackendKind {
    fn default() -> Self {
        if cfg!(feature = "audio") {
            Self::System
        } else {
            Self::Bell
        }
    }
}

impl BackendKind {
    /// Get display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Bell => "bell",
            Self::Off => "off",
        }
    }

    /// A deferred opener for this backend, for [`ToneEmitter`](crate::breath::ToneEmitter).
    #[must_use]
    pub fn opener(self) -> BackendInit {
        Box::new(move || open_backend(self))
    }
}

/// Open the backend of the given kind.
///
/// # Errors
///
/// Returns `BreathError::Audio` if the backend is `Off`, if the binary was
/// built without the `audio` feature and `System` is requested, or if the
/// output device cannot be opened.
pub fn open_backend(kind: BackendKind) -> Result<Box<dyn AudioBackend>, BreathError> {
    match kind {
        BackendKind::System => open_system(),
        BackendKind::Bell => Ok(Box::new(BellBackend::new(std::io::stderr()))),
        BackendKind::Off => Err(BreathError::Audio("sound backend is off".to_string())),
    }
}

#[cfg(feature = "audio")]
fn open_system() -> Result<Box<dyn AudioBackend>, BreathError> {
    Ok(Box::new(system::CpalBackend::open()?))
}

#[cfg(not(feature = "audio"))]
fn open_system() -> Result<Box<dyn AudioBackend>, BreathError> {
    Err(BreathError::Audio(
        "built without the `audio` feature".to_string(),
    ))
}

/// Rings the terminal bell for every tone.
///
/// [`open_backend`] rings on stderr so stdout stays free for command output.
#[derive(Debug)]
pub struct BellBackend<W: Write> {
    out: W,
}

impl<W: Write> BellBackend<W> {
    /// Ring bells on `out`.
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the backend, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AudioBackend for BellBackend<W> {
    fn play(&mut self, _tone: &ToneSpec) -> Result<(), BreathError> {
        self.out
            .write_all(b"\x07")
            .and_then(|()| self.out.flush())
            .map_err(|e| BreathError::Audio(format!("bell: {e}")))
    }

    fn name(&self) -> &'static str {
        "bell"
    }
}

#[cfg(feature = "audio")]
mod system {
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use crossbeam_channel::{bounded, Sender};
    use tracing::debug;

    use crate::breath::synth::{Mixer, ToneVoice};
    use crate::breath::tone::{AudioBackend, ToneSpec};
    use crate::error::BreathError;

    const VOICE_QUEUE: usize = 16;

    fn audio_err(context: &str, err: impl std::fmt::Display) -> BreathError {
        BreathError::Audio(format!("{context}: {err}"))
    }

    /// Synthesized output through cpal. Voices are handed to the device
    /// callback over a channel; the callback owns the mixer.
    pub struct CpalBackend {
        _stream: cpal::Stream,
        voices: Sender<ToneVoice>,
        sample_rate: u32,
    }

    impl CpalBackend {
        pub fn open() -> Result<Self, BreathError> {
            let host = cpal::default_host();
            let device = host
                .default_output_device()
                .ok_or_else(|| BreathError::Audio("no output device".to_string()))?;
            let supported = device
                .default_output_config()
                .map_err(|e| audio_err("output config", e))?;
            if supported.sample_format() != cpal::SampleFormat::F32 {
                return Err(BreathError::Audio(format!(
                    "unsupported sample format {:?}",
                    supported.sample_format()
                )));
            }

            let config: cpal::StreamConfig = supported.into();
            let channels = usize::from(config.channels);
            let sample_rate = config.sample_rate.0;
            let (voices, incoming) = bounded::<ToneVoice>(VOICE_QUEUE);

            let mut mixer = Mixer::new();
            let stream = device
                .build_output_stream(
                    &config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        while let Ok(voice) = incoming.try_recv() {
                            mixer.push(voice);
                        }
                        mixer.fill(data, channels);
                    },
                    |err| debug!(error = %err, "audio stream error"),
                    None,
                )
                .map_err(|e| audio_err("build stream", e))?;
            stream.play().map_err(|e| audio_err("start stream", e))?;

            debug!(sample_rate, channels, "audio stream started");
            Ok(Self {
                _stream: stream,
                voices,
                sample_rate,
            })
        }
    }

    impl AudioBackend for CpalBackend {
        fn play(&mut self, tone: &ToneSpec) -> Result<(), BreathError> {
            self.voices
                .try_send(ToneVoice::new(*tone, self.sample_rate))
                .map_err(|e| audio_err("queue tone", e))
        }

        fn name(&self) -> &'static str {
            "system"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breath::tone::Cue;

    #[test]
    fn test_bell_writes_one_bel_per_tone() {
        let mut bell = BellBackend::new(Vec::new());
        for tone in Cue::Completion.tones() {
            bell.play(tone).unwrap();
        }
        assert_eq!(bell.into_inner(), b"\x07\x07".to_vec());
    }

    #[test]
    fn test_off_backend_fails() {
        let err = open_backend(BackendKind::Off).err().unwrap();
        assert!(matches!(err, BreathError::Audio(_)));
    }

    #[test]
    fn test_bell_backend_opens() {
        let backend = open_backend(BackendKind::Bell).unwrap();
        assert_eq!(backend.name(), "bell");
    }

    #[cfg(not(feature = "audio"))]
    #[test]
    fn test_system_backend_unavailable_without_feature() {
        assert!(open_backend(BackendKind::System).is_err());
    }

    #[test]
    fn test_backend_kind_serde() {
        let kind: BackendKind = serde_yaml::from_str("bell").unwrap();
        assert_eq!(kind, BackendKind::Bell);
        let text = serde_yaml::to_string(&BackendKind::Off).unwrap();
        assert!(text.contains("off"));
        assert_eq!(serde_yaml::from_str::<BackendKind>(&text).unwrap(), BackendKind::Off);
    }

    #[cfg(not(feature = "audio"))]
    #[test]
    fn test_default_backend_is_bell_without_feature() {
        assert_eq!(BackendKind::default(), BackendKind::Bell);
        assert!(open_backend(BackendKind::default()).is_ok());
    }

    #[cfg(feature = "audio")]
    #[test]
    fn test_default_backend_is_system_with_feature() {
        assert_eq!(BackendKind::default(), BackendKind::System);
    }
}
