//! Fixed-timestep pacing.
//!
//! Converts variable frame times into a whole number of simulation ticks.

use std::time::Duration;

use tracing::debug;

/// Accumulates frame time and hands out fixed ticks.
#[derive(Debug, Clone)]
pub struct TickClock {
    /// Length of one tick
    tick: Duration,
    /// Time not yet consumed by ticks
    accumulator: Duration,
    /// Maximum ticks handed out per frame
    max_ticks: u32,
}

impl TickClock {
    /// Creates a clock for the given tick length.
    #[must_use]
    pub fn new(tick: Duration, max_ticks: u32) -> Self {
        Self {
            tick: tick.max(Duration::from_millis(1)),
            accumulator: Duration::ZERO,
            max_ticks: max_ticks.max(1),
        }
    }

    /// Adds a frame's elapsed time and returns how many ticks to run.
    pub fn accumulate(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed;
        let mut count = 0;

        while self.accumulator >= self.tick && count < self.max_ticks {
            self.accumulator -= self.tick;
            count += 1;
        }

        // Too far behind, drop the backlog
        if self.accumulator > self.tick * 2 {
            debug!("Dropping {:?} of tick backlog", self.accumulator);
            self.accumulator = Duration::ZERO;
        }

        count
    }

    /// Time waiting for the next tick.
    #[must_use]
    #[cfg(test)]
    pub const fn accumulated(&self) -> Duration {
        self.accumulator
    }

    /// Length of one tick.
    #[must_use]
    pub const fn tick(&self) -> Duration {
        self.tick
    }

    /// Clears the backlog (after a pause or a load).
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_whole_ticks() {
        let mut clock = TickClock::new(Duration::from_millis(50), 10);
        assert_eq!(clock.accumulate(Duration::from_millis(30)), 0);
        assert_eq!(clock.accumulate(Duration::from_millis(30)), 1);
        assert_eq!(clock.accumulated(), Duration::from_millis(10));
        assert_eq!(clock.accumulate(Duration::from_millis(100)), 2);
    }

    #[test]
    fn test_accumulate_caps_and_drops_backlog() {
        let mut clock = TickClock::new(Duration::from_millis(50), 4);
        assert_eq!(clock.accumulate(Duration::from_secs(2)), 4);
        assert_eq!(clock.accumulated(), Duration::ZERO);
    }

    #[test]
    fn test_sixty_fps_frames() {
        let mut clock = TickClock::new(Duration::from_millis(50), 10);
        let frame = Duration::from_secs(1) / 60;
        let ticks: u32 = (0..60).map(|_| clock.accumulate(frame)).sum();
        assert!((19..=20).contains(&ticks));
    }

    #[test]
    fn test_reset() {
        let mut clock = TickClock::new(Duration::from_millis(50), 10);
        clock.accumulate(Duration::from_millis(40));
        clock.reset();
        assert_eq!(clock.accumulated(), Duration::ZERO);
        assert_eq!(clock.tick(), Duration::from_millis(50));
    }
}
