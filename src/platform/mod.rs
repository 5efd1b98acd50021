//! Platform abstraction layer
//!
//! Handles host differences for:
//! - Time (injectable clock, manual in tests)
//! - Input (command surface and console parsing)
//! - Autopilot (demo steering that emits commands)

pub mod autopilot;
pub mod input;
pub mod time;

pub use input::{Command, CommandError, parse_command};
pub use time::{Clock, ManualClock, SystemClock};
