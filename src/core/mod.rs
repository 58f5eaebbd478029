//! Core abstractions shared by the session controller and its hosts.
//!
//! Time is read through [`Clock`] and deferred work goes through
//! [`TaskScheduler`]; neither touches threads.

mod clock;
mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use scheduler::{TaskHandle, TaskScheduler};
