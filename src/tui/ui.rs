//! UI rendering for the TUI.

use std::f64::consts::{FRAC_PI_2, TAU};

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Points},
        Block, Borders, Paragraph,
    },
    Frame,
};

use crate::breath::{hex_rgb, ColorToken, ViewModel};
use crate::core::Clock;
use crate::tui::app::App;
use crate::tui::event::HitAreas;

const RING_RADIUS: f64 = 0.9;
const ORB_RADIUS: f64 = 0.55;
const RING_POINTS: u32 = 360;
const SOUND_WIDTH: u16 = 12;

/// Render the application UI.
pub fn render<C: Clock>(frame: &mut Frame<'_>, app: &App<C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(6),    // Ring and orb
            Constraint::Length(1), // Label
            Constraint::Length(1), // Countdown
            Constraint::Length(1), // Hint
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let view = app.view();
    let sound = render_header(frame, view, chunks[0]);
    render_ring(frame, view, app.flash, chunks[1]);
    render_label(frame, view, chunks[2]);
    render_countdown(frame, view, chunks[3]);
    render_hint(frame, view, chunks[4]);
    render_status_bar(frame, app.status.as_deref(), chunks[5]);

    app.set_areas(HitAreas {
        ring: chunks[1],
        sound,
    });
}

/// Terminal colour for a token; the baseline token is neutral.
#[must_use]
pub fn token_color(token: &ColorToken) -> Color {
    hex_rgb(token).map_or(Color::Gray, |(r, g, b)| Color::Rgb(r, g, b))
}

/// Render the header. Returns the sound indicator's area.
fn render_header(frame: &mut Frame<'_>, view: &ViewModel, area: Rect) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" breathwork ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cycles = Paragraph::new(Line::from(vec![
        Span::styled("Cycles ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{}/{}", view.cycles_completed, view.cycles_target),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]));
    frame.render_widget(cycles, inner);

    let width = SOUND_WIDTH.min(inner.width);
    let sound_area = Rect::new(inner.right().saturating_sub(width), inner.y, width, inner.height.min(1));
    let (text, style) = if view.sound_enabled {
        (
            "Sound: On",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::REVERSED),
        )
    } else {
        ("Sound: Off", Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(
        Paragraph::new(text).style(style).alignment(Alignment::Right),
        sound_area,
    );
    sound_area
}

/// Points on the ring from 12 o'clock clockwise, covering `fraction`.
#[must_use]
pub fn arc_points(fraction: f64, radius: f64) -> Vec<(f64, f64)> {
    let fraction = fraction.clamp(0.0, 1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = (f64::from(RING_POINTS) * fraction).round() as u32;
    (0..count)
        .map(|i| {
            let angle = FRAC_PI_2 - TAU * f64::from(i) / f64::from(RING_POINTS);
            (radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

fn render_ring(frame: &mut Frame<'_>, view: &ViewModel, flash: bool, area: Rect) {
    let border = if view.active { Color::White } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);

    // Terminal cells are about twice as tall as wide
    let aspect = if inner.height == 0 {
        1.0
    } else {
        f64::from(inner.width) / (f64::from(inner.height) * 2.0)
    };
    let track = arc_points(1.0, RING_RADIUS);
    let filled = arc_points(view.ring.fraction, RING_RADIUS);
    let ring_color = if flash {
        Color::White
    } else {
        token_color(&view.ring.color)
    };
    let orb_color = view.color.as_ref().map_or(Color::Gray, token_color);
    let held = view.ring.held;
    let orb_radius = ORB_RADIUS * view.orb_scale;

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([-aspect.max(1.0), aspect.max(1.0)])
        .y_bounds([-1.0, 1.0])
        .paint(move |ctx| {
            ctx.draw(&Points {
                coords: &track,
                color: Color::DarkGray,
            });
            ctx.layer();
            ctx.draw(&Points {
                coords: &filled,
                color: ring_color,
            });
            if held {
                ctx.draw(&Circle {
                    x: 0.0,
                    y: 0.0,
                    radius: RING_RADIUS - 0.05,
                    color: ring_color,
                });
            }
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: orb_radius,
                color: orb_color,
            });
        });
    frame.render_widget(canvas, area);
}

fn render_label(frame: &mut Frame<'_>, view: &ViewModel, area: Rect) {
    let style = view
        .color
        .as_ref()
        .map_or_else(Style::default, |color| Style::default().fg(token_color(color)))
        .add_modifier(Modifier::BOLD);
    frame.render_widget(
        Paragraph::new(view.label.as_str())
            .style(style)
            .alignment(Alignment::Center),
        area,
    );
}

fn render_countdown(frame: &mut Frame<'_>, view: &ViewModel, area: Rect) {
    let text = if view.countdown == 0 {
        String::new()
    } else {
        view.countdown.to_string()
    };
    frame.render_widget(
        Paragraph::new(text)
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        area,
    );
}

fn render_hint(frame: &mut Frame<'_>, view: &ViewModel, area: Rect) {
    frame.render_widget(
        Paragraph::new(view.hint.as_str())
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

/// Render the status bar.
fn render_status_bar(frame: &mut Frame<'_>, status: Option<&str>, area: Rect) {
    let (text, style) = status.map_or(
        (
            "Space:start/pause | S:sound | +/-:cycles | q:quit",
            Style::default().fg(Color::DarkGray),
        ),
        |message| (message, Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(Paragraph::new(text).style(style), area);
}
