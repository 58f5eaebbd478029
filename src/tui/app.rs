//! Application state for the TUI.

use std::cell::Cell;
use std::time::Duration;

use tracing::info;

use crate::breath::{
    DriverTimings, PhasePlan, RenderPolicy, SessionController, ToneEmitter, ViewModel,
};
use crate::config::MAX_CYCLES;
use crate::core::{Clock, SystemClock};
use crate::tui::event::{Action, HitAreas};

/// Longest wait for input when no session task is pending.
pub const IDLE_POLL: Duration = Duration::from_millis(250);

/// Application state.
pub struct App<C: Clock = SystemClock> {
    session: SessionController<ViewModel, C>,
    /// Target cycle count chosen in the UI.
    pub cycles: u32,
    /// Draw the ring flashed this frame.
    pub flash: bool,
    /// One-line notice shown in the footer.
    pub status: Option<String>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Clickable areas from the last draw.
    areas: Cell<HitAreas>,
}

impl App<SystemClock> {
    /// Create the app with an idle session on the wall clock.
    #[must_use]
    pub fn new(
        plan: PhasePlan,
        cycles: u32,
        timings: DriverTimings,
        tones: ToneEmitter,
        policy: RenderPolicy,
    ) -> Self {
        Self::with_clock(plan, cycles, timings, tones, policy, SystemClock::new())
    }
}

impl<C: Clock> App<C> {
    /// Create the app on a custom clock.
    #[must_use]
    pub fn with_clock(
        plan: PhasePlan,
        cycles: u32,
        timings: DriverTimings,
        tones: ToneEmitter,
        policy: RenderPolicy,
        clock: C,
    ) -> Self {
        let cycles = cycles.clamp(1, MAX_CYCLES);
        let session = SessionController::new(
            plan,
            cycles,
            timings,
            ViewModel::new(policy),
            clock,
            tones,
        )
        .with_policy(policy);
        Self {
            session,
            cycles,
            flash: false,
            status: None,
            should_quit: false,
            areas: Cell::new(HitAreas::default()),
        }
    }

    /// The latest display state.
    #[must_use]
    pub const fn view(&self) -> &ViewModel {
        self.session.presenter()
    }

    #[must_use]
    pub const fn session(&self) -> &SessionController<ViewModel, C> {
        &self.session
    }

    /// Run due session work and advance the flash.
    pub fn tick(&mut self) {
        self.session.pump();
        self.flash = self.session.presenter_mut().take_flash();
    }

    /// How long to wait for input before the next tick.
    #[must_use]
    pub fn poll_timeout(&self) -> Duration {
        self.session
            .time_until_next_task()
            .map_or(IDLE_POLL, |wait| wait.min(IDLE_POLL))
    }

    /// Apply a user action.
    pub fn handle(&mut self, action: Action) {
        match action {
            Action::Toggle => {
                self.status = None;
                self.session.toggle();
                if self.session.tones().is_unavailable() && self.view().active {
                    self.status = Some("Sound unavailable".to_string());
                }
            }
            Action::ToggleSound => {
                let enabled = self.session.toggle_sound();
                self.status = if !enabled && self.session.tones().is_unavailable() {
                    Some("Sound unavailable".to_string())
                } else {
                    None
                };
            }
            Action::CyclesUp => self.set_cycles(self.cycles.saturating_add(1)),
            Action::CyclesDown => self.set_cycles(self.cycles.saturating_sub(1)),
            Action::SetCycles(cycles) => self.set_cycles(cycles),
            Action::Quit => self.should_quit = true,
        }
    }

    /// Change the target and reset the session.
    fn set_cycles(&mut self, cycles: u32) {
        let cycles = cycles.clamp(1, MAX_CYCLES);
        if cycles == self.cycles {
            return;
        }
        info!(cycles, "target cycles changed");
        self.cycles = cycles;
        self.status = None;
        self.session.on_configuration_changed(cycles);
    }

    /// Clickable areas recorded by the last draw.
    #[must_use]
    pub fn areas(&self) -> HitAreas {
        self.areas.get()
    }

    /// Record clickable areas while drawing.
    pub fn set_areas(&self, areas: HitAreas) {
        self.areas.set(areas);
    }
}
