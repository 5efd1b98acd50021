//! Fixed-cadence tick scheduler
//!
//! The host loop reports how much wall time passed since its last frame;
//! the scheduler turns that into a whole number of ticks, carrying the
//! remainder to the next frame.

use std::time::Duration;

use crate::consts::MAX_SUBSTEPS;

#[derive(Debug, Clone)]
pub struct FixedScheduler {
    interval: Duration,
    accumulator: Duration,
    running: bool,
}

impl FixedScheduler {
    /// Stopped scheduler firing every `interval` once started
    pub fn new(interval: Duration) -> Self {
        Self {
            // A zero interval would fire forever
            interval: interval.max(Duration::from_millis(1)),
            accumulator: Duration::ZERO,
            running: false,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            self.accumulator = Duration::ZERO;
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Feed elapsed frame time, returns how many ticks are due.
    ///
    /// At most `MAX_SUBSTEPS` ticks per call; any backlog beyond that is
    /// dropped so a stalled host cannot spiral.
    pub fn advance(&mut self, frame_dt: Duration) -> u32 {
        if !self.running {
            return 0;
        }

        self.accumulator += frame_dt;

        let mut ticks = 0;
        while self.accumulator >= self.interval && ticks < MAX_SUBSTEPS {
            self.accumulator -= self.interval;
            ticks += 1;
        }

        if ticks == MAX_SUBSTEPS && self.accumulator >= self.interval {
            log::debug!("Scheduler dropping {:?} of backlog", self.accumulator);
            self.accumulator = Duration::ZERO;
        }

        ticks
    }
}
