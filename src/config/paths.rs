//! Path resolution for breathwork configuration and log files.
//!
//! Everything lives in `~/.breathwork/`:
//! - `config.yaml` - Main configuration file
//! - `breathwork.log` - Log output while the terminal UI owns the screen

use std::path::PathBuf;

use crate::error::BreathError;

/// Paths to breathwork files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.breathwork/`
    pub root: PathBuf,
    /// Config file: `~/.breathwork/config.yaml`
    pub config_file: PathBuf,
    /// Log file: `~/.breathwork/breathwork.log`
    pub log_file: PathBuf,
}

impl Paths {
    /// Create paths based on the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, BreathError> {
        let home = std::env::var("HOME")
            .map_err(|_| BreathError::Config("Could not determine home directory".to_string()))?;

        Ok(Self::with_root(PathBuf::from(home).join(".breathwork")))
    }

    /// Create paths with a custom root directory.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            log_file: root.join("breathwork.log"),
            root,
        }
    }

    /// Use `config_file` instead of the default config location. The log
    /// file stays under the root.
    #[must_use]
    pub fn with_config_file(mut self, config_file: PathBuf) -> Self {
        self.config_file = config_file;
        self
    }

    /// Ensure the root directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), BreathError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                BreathError::Config(format!(
                    "Failed to create directory {}: {e}",
                    self.root.display()
                ))
            })?;
        }
        Ok(())
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_root(PathBuf::from(".breathwork")))
    }
}
