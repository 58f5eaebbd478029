//! The `config` command: show, locate or create the configuration file.

use colored::Colorize;
use serde::Serialize;

use crate::cli::args::{ConfigCommands, OutputFormat};
use crate::config::{Config, Paths};
use crate::error::BreathError;
use crate::output::{format_config_pretty, to_json};

#[derive(Serialize)]
struct ConfigPath<'a> {
    path: &'a std::path::Path,
    exists: bool,
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be read, parsed or
/// written, or if `init` would overwrite a file without `--force`.
pub fn config(paths: &Paths, cmd: &ConfigCommands, format: OutputFormat) -> Result<String, BreathError> {
    match cmd {
        ConfigCommands::Show => show(paths, format),
        ConfigCommands::Path => {
            let info = ConfigPath {
                path: &paths.config_file,
                exists: paths.config_file.exists(),
            };
            match format {
                OutputFormat::Json => to_json(&info),
                OutputFormat::Pretty => Ok(paths.config_file.display().to_string()),
            }
        }
        ConfigCommands::Init { force } => init(paths, *force),
    }
}

fn show(paths: &Paths, format: OutputFormat) -> Result<String, BreathError> {
    let config = Config::load_from_path(&paths.config_file)?;
    match format {
        OutputFormat::Json => to_json(&config),
        OutputFormat::Pretty => {
            let source = if paths.config_file.exists() {
                paths.config_file.display().to_string()
            } else {
                format!("defaults ({} not found)", paths.config_file.display())
            };
            Ok(format_config_pretty(&config, &source)?)
        }
    }
}

fn init(paths: &Paths, force: bool) -> Result<String, BreathError> {
    if paths.config_file.exists() && !force {
        return Err(BreathError::Config(format!(
            "{} already exists (use --force to overwrite)",
            paths.config_file.display()
        )));
    }
    Config::default().save_to_path(&paths.config_file)?;
    Ok(format!(
        "{} {}",
        "Wrote".green(),
        paths.config_file.display()
    ))
}
