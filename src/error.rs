//! Error types for breathwork.

use thiserror::Error;

/// Errors surfaced outside the session core.
///
/// The session controller itself never fails: audio problems degrade to
/// silence and invalid transitions are no-ops. These variants cover the
/// edges around it (configuration, arguments, terminal, audio setup).
#[derive(Debug, Error)]
pub enum BreathError {
    /// Configuration could not be loaded, saved or validated.
    #[error("configuration error: {0}")]
    Config(String),

    /// A value could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// A breathing pattern argument was malformed.
    #[error("invalid breathing pattern '{0}' (expected e.g. 4-7-8)")]
    InvalidPattern(String),

    /// The audio backend could not be opened or refused a tone.
    #[error("audio error: {0}")]
    Audio(String),

    /// Terminal setup, drawing or input failed.
    #[error("terminal error: {0}")]
    Terminal(String),

    /// I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML serialization failure.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl BreathError {
    /// Wrap a terminal-layer failure with a short description.
    pub fn terminal(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Terminal(format!("{context}: {err}"))
    }
}
