//! Output formatting for breathwork.
//!
//! Pretty output is colored for humans; JSON output is for scripts.

mod json;
mod pretty;

use crate::breath::{PlanReport, SessionSummary};
use crate::cli::args::OutputFormat;
use crate::error::BreathError;

pub use json::*;
pub use pretty::*;

/// Format a plan based on output format
///
/// # Errors
///
/// Returns `BreathError::Json` if JSON serialization fails.
pub fn format_plan(plan: &PlanReport, format: OutputFormat) -> Result<String, BreathError> {
    match format {
        OutputFormat::Pretty => Ok(format_plan_pretty(plan)),
        OutputFormat::Json => to_json(plan),
    }
}

/// Format a session summary based on output format
///
/// # Errors
///
/// Returns `BreathError::Json` if JSON serialization fails.
pub fn format_summary(
    summary: &SessionSummary,
    format: OutputFormat,
) -> Result<String, BreathError> {
    match format {
        OutputFormat::Pretty => Ok(format_summary_pretty(summary)),
        OutputFormat::Json => to_json(summary),
    }
}
