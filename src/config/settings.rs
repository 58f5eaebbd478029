//! Configuration settings for breathwork.
//!
//! Settings are loaded from `~/.breathwork/config.yaml`. Every field has a
//! default, so a partial file (or none at all) is fine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::breath::{BackendKind, PhaseKind, PhasePlan, RenderPolicy};
use crate::config::Paths;
use crate::error::BreathError;

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Session length and tick cadence.
    pub session: SessionConfig,
    /// Per-phase length, colour and hint.
    pub phases: PhasesConfig,
    /// Tone settings.
    pub sound: SoundConfig,
    /// Rendering policy.
    pub display: DisplayConfig,
    /// Logging settings.
    pub log: LogConfig,
}

/// Most cycles a session may have.
pub const MAX_CYCLES: u32 = 99;

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Full cycles per session, `1..=MAX_CYCLES`.
    #[serde(default = "default_target_cycles")]
    pub target_cycles: u32,
    /// Progress refresh interval in milliseconds.
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
    /// Countdown refresh interval in milliseconds.
    #[serde(default = "default_countdown_interval")]
    pub countdown_interval_ms: u64,
}

/// One phase entry. Only `seconds` is required; a missing colour or hint
/// falls back to that phase's default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSettings {
    /// Length in seconds.
    pub seconds: f64,
    /// Colour token, e.g. `#7dd3fc`.
    #[serde(default)]
    pub color: String,
    /// Guidance text.
    #[serde(default)]
    pub hint: String,
}

/// The three phase entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhasesConfig {
    #[serde(default = "default_inhale")]
    pub inhale: PhaseSettings,
    #[serde(default = "default_hold")]
    pub hold: PhaseSettings,
    #[serde(default = "default_exhale")]
    pub exhale: PhaseSettings,
}

/// Sound settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    /// Start with sound on.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Which backend plays tones.
    #[serde(default)]
    pub backend: BackendKind,
}

/// Rendering policy settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Draw the Hold ring as a flat, steady fill.
    #[serde(default = "default_true")]
    pub flat_hold_fill: bool,
    /// Flash the ring when a phase starts.
    #[serde(default)]
    pub flash_on_phase: bool,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Write logs to `~/.breathwork/breathwork.log` while the terminal UI
    /// runs.
    #[serde(default = "default_true")]
    pub file: bool,
}

// Default value functions for serde
const fn default_target_cycles() -> u32 {
    4
}

const fn default_frame_interval() -> u64 {
    16
}

const fn default_countdown_interval() -> u64 {
    100
}

const fn default_true() -> bool {
    true
}

fn phase_defaults(kind: PhaseKind) -> PhaseSettings {
    let (seconds, color, hint) = match kind {
        PhaseKind::Inhale => (4.0, "#7dd3fc", "Breathe in gently through the nose"),
        PhaseKind::Hold => (7.0, "#fcd34d", "Rest softly, shoulders relaxed"),
        PhaseKind::Exhale => (8.0, "#c4b5fd", "Exhale slowly through the mouth"),
    };
    PhaseSettings {
        seconds,
        color: color.to_string(),
        hint: hint.to_string(),
    }
}

fn default_inhale() -> PhaseSettings {
    phase_defaults(PhaseKind::Inhale)
}

fn default_hold() -> PhaseSettings {
    phase_defaults(PhaseKind::Hold)
}

fn default_exhale() -> PhaseSettings {
    phase_defaults(PhaseKind::Exhale)
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target_cycles: default_target_cycles(),
            frame_interval_ms: default_frame_interval(),
            countdown_interval_ms: default_countdown_interval(),
        }
    }
}

impl Default for PhasesConfig {
    fn default() -> Self {
        Self {
            inhale: default_inhale(),
            hold: default_hold(),
            exhale: default_exhale(),
        }
    }
}

impl PhasesConfig {
    /// Replace empty colours and hints with each phase's default.
    pub fn fill_blanks(&mut self) {
        for (kind, settings) in [
            (PhaseKind::Inhale, &mut self.inhale),
            (PhaseKind::Hold, &mut self.hold),
            (PhaseKind::Exhale, &mut self.exhale),
        ] {
            let defaults = phase_defaults(kind);
            if settings.color.trim().is_empty() {
                settings.color = defaults.color;
            }
            if settings.hint.trim().is_empty() {
                settings.hint = defaults.hint;
            }
        }
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            backend: BackendKind::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            flat_hold_fill: default_true(),
            flash_on_phase: false,
        }
    }
}

impl DisplayConfig {
    /// The renderer policy these settings describe.
    #[must_use]
    pub const fn policy(&self) -> RenderPolicy {
        RenderPolicy {
            flat_hold_fill: self.flat_hold_fill,
            flash_on_phase: self.flash_on_phase,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// holds invalid values.
    pub fn load() -> Result<Self, BreathError> {
        let paths = Paths::new()?;
        Self::load_from_path(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// holds invalid values.
    pub fn load_from_path(path: &Path) -> Result<Self, BreathError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            BreathError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let mut config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            BreathError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })?;
        config.phases.fill_blanks();
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &Path) -> Result<(), BreathError> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| BreathError::Config(format!("Failed to serialize config: {e}")))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                BreathError::Config(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        std::fs::write(path, contents).map_err(|e| {
            BreathError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `BreathError::Config` naming the first invalid value.
    pub fn validate(&self) -> Result<(), BreathError> {
        if self.session.target_cycles == 0 {
            return Err(BreathError::Config(
                "session.target_cycles must be at least 1".to_string(),
            ));
        }
        if self.session.target_cycles > MAX_CYCLES {
            return Err(BreathError::Config(format!(
                "session.target_cycles must be at most {MAX_CYCLES}"
            )));
        }
        if self.session.frame_interval_ms == 0 {
            return Err(BreathError::Config(
                "session.frame_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.session.countdown_interval_ms == 0 {
            return Err(BreathError::Config(
                "session.countdown_interval_ms must be at least 1".to_string(),
            ));
        }
        PhasePlan::from_config(&self.phases).map(|_| ())
    }

    /// The phase plan these settings describe.
    ///
    /// # Errors
    ///
    /// Returns `BreathError::Config` if a phase length is invalid.
    pub fn plan(&self) -> Result<PhasePlan, BreathError> {
        PhasePlan::from_config(&self.phases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breath::ToneEmitter;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.session.target_cycles, 4);
        assert_eq!(config.session.frame_interval_ms, 16);
        assert_eq!(config.session.countdown_interval_ms, 100);
        assert!((config.phases.hold.seconds - 7.0).abs() < f64::EPSILON);
        assert_eq!(config.phases.exhale.color, "#c4b5fd");
        assert!(config.sound.enabled);
        assert_eq!(config.sound.backend, BackendKind::default());
        assert!(config.display.flat_hold_fill);
        assert!(!config.display.flash_on_phase);
        assert!(config.log.file);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let config = Config::load_from_path(&config_path).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sub").join("config.yaml");

        let mut config = Config::default();
        config.session.target_cycles = 7;
        config.phases.inhale.seconds = 5.5;
        config.sound.backend = BackendKind::Bell;

        config.save_to_path(&config_path).unwrap();
        let loaded = Config::load_from_path(&config_path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let partial_yaml = r"
session:
  target_cycles: 2
phases:
  hold:
    seconds: 5
sound:
  backend: off
";
        std::fs::write(&config_path, partial_yaml).unwrap();

        let config = Config::load_from_path(&config_path).unwrap();

        assert_eq!(config.session.target_cycles, 2);
        assert_eq!(config.session.frame_interval_ms, 16);
        assert!((config.phases.hold.seconds - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.phases.hold.color, "#fcd34d");
        assert_eq!(config.phases.hold.hint, "Rest softly, shoulders relaxed");
        assert!((config.phases.inhale.seconds - 4.0).abs() < f64::EPSILON);
        assert_eq!(config.sound.backend, BackendKind::Off);
        assert!(config.sound.enabled);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        for yaml in [
            "session:\n  target_cycles: 0\n",
            "session:\n  target_cycles: 200\n",
            "session:\n  frame_interval_ms: 0\n",
            "phases:\n  exhale:\n    seconds: -2\n",
            "phases:\n  inhale:\n    seconds: 0\n",
        ] {
            std::fs::write(&config_path, yaml).unwrap();
            let err = Config::load_from_path(&config_path).unwrap_err();
            assert!(matches!(err, BreathError::Config(_)), "accepted {yaml:?}");
        }
    }

    #[test]
    fn test_max_cycles_accepted() {
        let mut config = Config::default();
        config.session.target_cycles = MAX_CYCLES;
        assert!(config.validate().is_ok());

        config.session.target_cycles = MAX_CYCLES + 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most 99"));
    }

    #[cfg(not(feature = "audio"))]
    #[test]
    fn test_default_sound_backend_opens() {
        let config = Config::default();
        let mut tones = ToneEmitter::new(config.sound.backend.opener(), config.sound.enabled);
        assert!(tones.ensure_ready());
        assert!(tones.sound_enabled());
        assert_eq!(tones.backend_name(), Some("bell"));
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "session: [not, a, map").unwrap();

        let err = Config::load_from_path(&config_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_display_policy() {
        let display = DisplayConfig {
            flat_hold_fill: false,
            flash_on_phase: true,
        };
        let policy = display.policy();
        assert!(!policy.flat_hold_fill);
        assert!(policy.flash_on_phase);
    }
}
