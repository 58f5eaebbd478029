//! Shell completion generation.

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::args::Cli;
use crate::error::BreathError;

/// Generate a completion script for `shell`.
///
/// # Errors
///
/// Returns an error if the generated script is not valid UTF-8.
pub fn completions(shell: Shell) -> Result<String, BreathError> {
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut Cli::command(), "breathwork", &mut buf);
    String::from_utf8(buf).map_err(|e| BreathError::Parse(format!("UTF-8 error: {e}")))
}
