//! Configuration management for breathwork.
//!
//! This module handles loading and saving configuration from `~/.breathwork/`.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{
    Config, DisplayConfig, LogConfig, PhaseSettings, PhasesConfig, SessionConfig, SoundConfig,
    MAX_CYCLES,
};
