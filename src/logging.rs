//! Tracing subscriber setup.
//!
//! `BREATHWORK_LOG` takes any `EnvFilter` directive and wins over `-v`.
//! While the terminal UI owns the screen, logs go to a file or nowhere.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive.
pub const LOG_ENV: &str = "BREATHWORK_LOG";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Append to a file, without colours.
    File(PathBuf),
    Off,
}

/// Filter level for a `-v` count.
#[must_use]
pub const fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level(verbose)))
}

/// Install the global subscriber. Calling it twice keeps the first one.
///
/// A log file that cannot be created or opened turns logging off rather
/// than failing the command.
pub fn init(verbose: u8, target: &LogTarget) {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(verbose));
    // try_init fails only when a subscriber is already set
    let _ = match target {
        LogTarget::Stderr => builder.with_writer(io::stderr).try_init(),
        LogTarget::File(path) => match open_log_file(path) {
            Ok(file) => builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init(),
            Err(_) => builder.with_writer(io::sink).try_init(),
        },
        LogTarget::Off => builder.with_writer(io::sink).try_init(),
    };
}

/// Open `path` for appending, creating it and its directory.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created or opened.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(0), "warn");
        assert_eq!(default_level(1), "info");
        assert_eq!(default_level(2), "debug");
        assert_eq!(default_level(9), "debug");
    }

    #[test]
    fn test_file_target_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs").join("breathwork.log");

        init(1, &LogTarget::File(path.clone()));
        assert!(path.exists());
    }

    #[test]
    fn test_unwritable_log_path_is_skipped() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join(".breathwork");
        std::fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("breathwork.log");

        assert!(open_log_file(&path).is_err());
        init(0, &LogTarget::File(path.clone()));
        assert!(!path.exists());
    }
}
