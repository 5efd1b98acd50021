//! Speed curve
//!
//! Level 1 is a fixed baseline. Above that the move interval follows
//! `round(-10 * ln(level - 1) + 70)` ms, so each extra level buys less speed
//! than the one before.

use std::time::Duration;

use crate::consts::BASE_MOVE_INTERVAL_MS;

/// Snake move interval in milliseconds for a speed level (0 is treated as 1)
pub fn move_interval_ms(level: u32) -> u64 {
    if level <= 1 {
        return BASE_MOVE_INTERVAL_MS;
    }

    let ms = (-10.0 * f64::from(level - 1).ln() + 70.0).round();
    ms.max(0.0) as u64
}

pub fn move_interval(level: u32) -> Duration {
    Duration::from_millis(move_interval_ms(level))
}
