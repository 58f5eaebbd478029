//! breathwork - A guided-breathing timer for the terminal
//!
//! This crate drives Inhale, Hold and Exhale phases with a ring, an orb,
//! a countdown and short tones, from a full-screen terminal UI or a
//! headless line printer.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod breath;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod output;
pub mod tui;

pub use breath::{PhasePlan, SessionController, SessionStatus};
pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::BreathError;
