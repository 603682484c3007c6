//=========================================================================
// Frame Timing
//
// Wall-clock sampling for the session, built on `std::time::Instant`
// (monotonic, sub-millisecond resolution on every supported platform).
//
// Exposes:
// - elapsed time since session creation
// - delta between the two most recent polls
// - derived FPS (reciprocal of delta)
//
// The very first `tick` after creation reports the time since
// construction; every later tick reports the true inter-poll delta.
//
//=========================================================================

use std::time::{Duration, Instant};

//=== Clock ===============================================================

/// Per-session frame clock.
pub(crate) struct Clock {
    started: Instant,
    current: Instant,
    delta: Duration,
}

impl Clock {
    /// Creates a clock anchored at the current instant. Delta starts at
    /// zero until the first tick.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            current: now,
            delta: Duration::ZERO,
        }
    }

    /// Samples the wall clock, updating the delta to the distance from
    /// the previous sample (or from construction, on the first call).
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.current;
        self.current = now;
    }

    /// Seconds since the clock was created.
    pub fn elapsed(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Seconds between the two most recent ticks.
    pub fn delta(&self) -> f64 {
        self.delta.as_secs_f64()
    }

    /// Predicted frames per second: the reciprocal of the last delta.
    ///
    /// Defined as 0 when the delta is exactly zero; this is an
    /// approximation from a single frame, not a measurement.
    pub fn fps(&self) -> f64 {
        let delta = self.delta.as_secs_f64();
        if delta == 0.0 {
            return 0.0;
        }
        1.0 / delta
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Before the first tick the delta is exactly zero, so fps is 0.
    #[test]
    fn fps_is_zero_when_delta_is_zero() {
        let clock = Clock::new();
        assert_eq!(clock.delta(), 0.0);
        assert_eq!(clock.fps(), 0.0);
    }

    /// Ticking produces a non-negative delta and a positive fps once
    /// any time has passed.
    #[test]
    fn tick_updates_delta() {
        let mut clock = Clock::new();
        std::thread::sleep(Duration::from_millis(2));
        clock.tick();

        assert!(clock.delta() > 0.0);
        assert!(clock.fps() > 0.0);
    }

    /// Elapsed time grows monotonically and is independent of ticks.
    #[test]
    fn elapsed_is_monotonic() {
        let clock = Clock::new();
        let a = clock.elapsed();
        std::thread::sleep(Duration::from_millis(2));
        let b = clock.elapsed();
        assert!(b > a);
    }

    /// The first tick measures time since construction.
    #[test]
    fn first_tick_measures_since_construction() {
        let mut clock = Clock::new();
        std::thread::sleep(Duration::from_millis(5));
        clock.tick();
        assert!(clock.delta() >= 0.005);
    }
}
