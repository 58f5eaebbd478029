//! The `run` command: a breathing session in the terminal UI or headless.

use std::io::{self, Write};
use std::thread;

use chrono::Local;
use tracing::{debug, info};

use crate::breath::{
    pattern_label, DriverTimings, LinePresenter, PhasePlan, RenderPolicy, SessionController,
    SessionStatus, SessionSummary, ToneEmitter,
};
use crate::cli::args::{OutputFormat, RunArgs};
use crate::cli::commands::session_plan;
use crate::config::Config;
use crate::core::SystemClock;
use crate::error::BreathError;
use crate::output::format_summary;

/// Execute the run command.
///
/// Without `--headless` this hands the terminal to the breathing ring and
/// returns an empty string once the user quits.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the terminal cannot
/// be set up, or output formatting fails.
pub fn run(config: &Config, args: &RunArgs, format: OutputFormat) -> Result<String, BreathError> {
    let (plan, target) = session_plan(config, &args.session)?;
    let timings = DriverTimings::from_config(&config.session);
    let backend = args.backend.unwrap_or(config.sound.backend);
    let sound = config.sound.enabled && !args.mute;
    let tones = ToneEmitter::new(backend.opener(), sound);
    let policy = config.display.policy();
    debug!(backend = backend.display_name(), sound, target, "run");

    if !args.headless {
        crate::tui::run(plan, target, timings, tones, policy)?;
        return Ok(String::new());
    }

    // Phase lines would corrupt JSON on stdout
    let out: Box<dyn Write> = match format {
        OutputFormat::Pretty => Box::new(io::stdout()),
        OutputFormat::Json => Box::new(io::stderr()),
    };
    let (summary, _) = run_headless(plan, target, timings, tones, policy, out);
    format_summary(&summary, format)
}

/// Run one full session without a terminal UI, printing a line per phase
/// to `out`. Starts at once and returns when every cycle has finished.
pub fn run_headless<W: Write>(
    plan: PhasePlan,
    target_cycles: u32,
    timings: DriverTimings,
    tones: ToneEmitter,
    policy: RenderPolicy,
    out: W,
) -> (SessionSummary, W) {
    let pattern = pattern_label(&plan);
    let started_at = Local::now();
    let mut session = SessionController::new(
        plan,
        target_cycles,
        timings,
        LinePresenter::new(out),
        SystemClock::new(),
        tones,
    )
    .with_policy(policy);

    session.start();
    while session.status() == SessionStatus::Running {
        let Some(wait) = session.time_until_next_task() else {
            break;
        };
        if !wait.is_zero() {
            thread::sleep(wait);
        }
        session.pump();
    }

    let snapshot = session.snapshot();
    info!(cycles = snapshot.cycle_count, "headless session finished");
    let summary = SessionSummary {
        started_at,
        finished_at: Local::now(),
        pattern,
        cycles_completed: snapshot.cycle_count,
        target_cycles: snapshot.target_cycles,
        sound_enabled: snapshot.sound_enabled,
        backend: session.tones().backend_name().map(str::to_string),
    };
    (summary, session.into_presenter().into_inner())
}
