//! Command implementations for breathwork.
//!
//! Each command returns the text to print, already formatted for the
//! requested output format.

mod completions;
mod config;
mod plan;
mod run;

pub use completions::completions;
pub use config::config;
pub use plan::plan;
pub use run::{run, run_headless};

use crate::breath::PhasePlan;
use crate::cli::args::SessionArgs;
use crate::config::Config;
use crate::error::BreathError;

/// The phase plan and cycle count after command-line overrides.
///
/// # Errors
///
/// Returns an error if the configured phases are invalid.
pub fn session_plan(config: &Config, args: &SessionArgs) -> Result<(PhasePlan, u32), BreathError> {
    let mut plan = config.plan()?;
    if let Some(pattern) = args.pattern {
        plan = plan.with_pattern(pattern);
    }
    let target = args.cycles.unwrap_or(config.session.target_cycles);
    Ok((plan, target))
}
