//! The rendering seam between the session controller and a display.
//!
//! The controller only pushes updates through [`Presenter`]. [`ViewModel`]
//! keeps the latest state for a redraw-on-demand renderer such as the
//! terminal UI; [`LinePresenter`] prints transitions as plain lines.

use std::io::Write;

use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use crate::breath::phase::{ColorToken, Phase};
use crate::breath::visual::{RenderPolicy, RingFill, VisualFrame};

/// Frames a phase-start flash stays visible.
pub const FLASH_FRAMES: u8 = 8;

/// Status messages shown in place of a phase label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Banner {
    /// Nothing started yet, or configuration just changed.
    Ready,
    /// Session paused mid-phase.
    Paused,
    /// All cycles done.
    Complete,
}

impl Banner {
    /// Text shown in the label slot.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Paused => "Paused",
            Self::Complete => "Cycle complete ✓",
        }
    }

    /// Text shown in the hint slot.
    #[must_use]
    pub const fn hint(self) -> &'static str {
        match self {
            Self::Ready => "Tap the ring to begin",
            Self::Paused => "Tap the ring to resume",
            Self::Complete => "Tap the ring to start again",
        }
    }
}

/// Receives display updates from the session controller.
///
/// Implementations must not call back into the controller.
pub trait Presenter {
    /// A phase started or resumed: label, hint and colour.
    fn show_phase(&mut self, phase: &Phase);
    /// Replace label and hint with a status banner.
    fn show_banner(&mut self, banner: Banner);
    /// Ring fill and orb scale.
    fn show_visual(&mut self, frame: &VisualFrame);
    /// Whole seconds left in the phase.
    fn show_countdown(&mut self, seconds: u32);
    /// Whether the ring is pressed (session running).
    fn set_active(&mut self, active: bool);
    /// Sound indicator.
    fn show_sound(&mut self, enabled: bool);
    /// Completed and target cycle counts.
    fn show_cycles(&mut self, completed: u32, target: u32);
}

/// Latest display state, for renderers that redraw on their own schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub label: String,
    pub hint: String,
    /// Label colour; `None` while a banner is shown.
    pub color: Option<ColorToken>,
    pub banner: Option<Banner>,
    pub ring: RingFill,
    pub orb_scale: f64,
    pub countdown: u32,
    pub active: bool,
    pub sound_enabled: bool,
    pub cycles_completed: u32,
    pub cycles_target: u32,
    #[serde(skip)]
    pub policy: RenderPolicy,
    #[serde(skip)]
    flash: u8,
}

impl ViewModel {
    /// The Ready state.
    #[must_use]
    pub fn new(policy: RenderPolicy) -> Self {
        let baseline = VisualFrame::baseline();
        Self {
            label: Banner::Ready.label().to_string(),
            hint: Banner::Ready.hint().to_string(),
            color: None,
            banner: Some(Banner::Ready),
            ring: baseline.ring,
            orb_scale: baseline.orb_scale,
            countdown: 0,
            active: false,
            sound_enabled: false,
            cycles_completed: 0,
            cycles_target: 0,
            policy,
            flash: 0,
        }
    }

    /// Whether the ring should be drawn flashed this frame. Counts the
    /// flash down by one frame.
    pub fn take_flash(&mut self) -> bool {
        if self.flash == 0 {
            return false;
        }
        self.flash -= 1;
        true
    }
}

impl Default for ViewModel {
    fn default() -> Self {
        Self::new(RenderPolicy::default())
    }
}

impl Presenter for ViewModel {
    fn show_phase(&mut self, phase: &Phase) {
        self.label = phase.kind.display_name().to_string();
        self.hint.clone_from(&phase.hint);
        self.color = Some(phase.color.clone());
        self.banner = None;
        if self.policy.flash_on_phase {
            self.flash = FLASH_FRAMES;
        }
    }

    fn show_banner(&mut self, banner: Banner) {
        self.label = banner.label().to_string();
        self.hint = banner.hint().to_string();
        self.color = None;
        self.banner = Some(banner);
        self.flash = 0;
    }

    fn show_visual(&mut self, frame: &VisualFrame) {
        self.ring = frame.ring.clone();
        self.orb_scale = frame.orb_scale;
    }

    fn show_countdown(&mut self, seconds: u32) {
        self.countdown = seconds;
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn show_sound(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }

    fn show_cycles(&mut self, completed: u32, target: u32) {
        self.cycles_completed = completed;
        self.cycles_target = target;
    }
}

/// Parse a `#rrggbb` token.
#[must_use]
pub fn hex_rgb(token: &ColorToken) -> Option<(u8, u8, u8)> {
    let hex = token.as_str().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Prints one line per transition. Used by the headless runner.
///
/// Progress and countdown ticks are ignored; only changes a reader would
/// care about are written.
#[derive(Debug)]
pub struct LinePresenter<W: Write> {
    out: W,
    cycle: u32,
    target: u32,
}

impl<W: Write> LinePresenter<W> {
    /// Print to `out`.
    pub const fn new(out: W) -> Self {
        Self {
            out,
            cycle: 0,
            target: 0,
        }
    }

    /// Consume the presenter, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}") {
            debug!(error = %err, "presenter output failed");
        }
    }
}

impl<W: Write> Presenter for LinePresenter<W> {
    fn show_phase(&mut self, phase: &Phase) {
        let name = format!("{:<7}", phase.kind.display_name());
        let name = match hex_rgb(&phase.color) {
            Some((r, g, b)) => name.truecolor(r, g, b).bold().to_string(),
            None => name.bold().to_string(),
        };
        let text = format!(
            "{} {} {:>5}  {}",
            format!("[{}/{}]", self.cycle + 1, self.target).dimmed(),
            name,
            format!("{:.1}s", phase.duration.as_secs_f64()),
            phase.hint.dimmed()
        );
        self.line(&text);
    }

    fn show_banner(&mut self, banner: Banner) {
        let text = match banner {
            Banner::Complete => banner.label().green().bold().to_string(),
            Banner::Paused => banner.label().yellow().to_string(),
            Banner::Ready => banner.label().to_string(),
        };
        self.line(&text);
    }

    fn show_visual(&mut self, _frame: &VisualFrame) {}

    fn show_countdown(&mut self, _seconds: u32) {}

    fn set_active(&mut self, _active: bool) {}

    fn show_sound(&mut self, _enabled: bool) {}

    fn show_cycles(&mut self, completed: u32, target: u32) {
        self.cycle = completed;
        self.target = target;
    }
}
