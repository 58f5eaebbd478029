//! Terminal User Interface (TUI) for breathwork.
//!
//! Draws the breathing ring, orb, phase label, countdown and hint, and
//! maps keys and clicks onto the session controller. Built with ratatui
//! and crossterm.

mod app;
mod event;
mod ui;

pub use app::App;
pub use event::{map_event, Action, HitAreas};

use std::io;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing::info;

use crate::breath::{DriverTimings, PhasePlan, RenderPolicy, ToneEmitter};
use crate::core::Clock;
use crate::error::BreathError;

/// Run the TUI application until the user quits.
///
/// # Errors
///
/// Returns an error if the TUI fails to initialize or run.
pub fn run(
    plan: PhasePlan,
    cycles: u32,
    timings: DriverTimings,
    tones: ToneEmitter,
    policy: RenderPolicy,
) -> Result<(), BreathError> {
    enable_raw_mode().map_err(|e| BreathError::terminal("Failed to enable raw mode", e))?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
        disable_raw_mode().ok();
        return Err(BreathError::terminal("Failed to setup terminal", e));
    }

    let backend = CrosstermBackend::new(stdout);
    let result = Terminal::new(backend)
        .map_err(|e| BreathError::terminal("Failed to create terminal", e))
        .and_then(|mut terminal| {
            let mut app = App::new(plan, cycles, timings, tones, policy);
            let result = run_app(&mut terminal, &mut app);
            terminal.show_cursor().ok();
            result
        });

    // Restore terminal
    disable_raw_mode().ok();
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture).ok();

    result
}

/// Run the main application loop.
fn run_app<B: Backend, C: Clock>(
    terminal: &mut Terminal<B>,
    app: &mut App<C>,
) -> Result<(), BreathError> {
    info!("terminal UI started");
    while !app.should_quit {
        app.tick();

        terminal
            .draw(|frame| ui::render(frame, app))
            .map_err(|e| BreathError::terminal("Failed to draw", e))?;

        if let Some(action) = event::next_action(app.poll_timeout(), app.areas())? {
            app.handle(action);
        }
    }
    info!(status = %app.session().status(), "terminal UI closed");
    Ok(())
}
