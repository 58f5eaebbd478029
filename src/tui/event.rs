//! Event handling for the TUI.

use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::error::BreathError;

/// Action to take after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start, pause or resume.
    Toggle,
    /// Sound on/off.
    ToggleSound,
    /// One more cycle.
    CyclesUp,
    /// One fewer cycle.
    CyclesDown,
    /// Set the cycle count directly.
    SetCycles(u32),
    /// Quit the application.
    Quit,
}

/// Screen areas that react to clicks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitAreas {
    pub ring: Rect,
    pub sound: Rect,
}

/// Wait up to `timeout` for input and map it to an action.
///
/// Returns `None` on timeout or for input with no binding.
///
/// # Errors
///
/// Returns an error if event polling fails.
pub fn next_action(timeout: Duration, areas: HitAreas) -> Result<Option<Action>, BreathError> {
    if !event::poll(timeout).map_err(|e| BreathError::terminal("Event poll failed", e))? {
        return Ok(None);
    }
    let event = event::read().map_err(|e| BreathError::terminal("Event read failed", e))?;
    Ok(map_event(&event, areas))
}

/// Map one terminal event to an action.
#[must_use]
pub fn map_event(event: &Event, areas: HitAreas) -> Option<Action> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Some(Action::Quit);
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
                KeyCode::Char(' ') | KeyCode::Enter => Some(Action::Toggle),
                KeyCode::Char('S') => Some(Action::ToggleSound),
                KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::SHIFT) => {
                    Some(Action::ToggleSound)
                }
                KeyCode::Char('+' | '=') | KeyCode::Right => Some(Action::CyclesUp),
                KeyCode::Char('-') | KeyCode::Left => Some(Action::CyclesDown),
                KeyCode::Char(c @ '1'..='9') => c.to_digit(10).map(Action::SetCycles),
                _ => None,
            }
        }
        Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
            if hit(areas.sound, mouse.column, mouse.row) {
                Some(Action::ToggleSound)
            } else if hit(areas.ring, mouse.column, mouse.row) {
                Some(Action::Toggle)
            } else {
                None
            }
        }
        _ => None,
    }
}

const fn hit(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}
