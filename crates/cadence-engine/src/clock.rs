//! Frame clock driven by the host's tick calls.
//!
//! [`TickClock`] accumulates two timelines from the per-frame delta passed
//! to `advance_one_tick()`: real time (the raw delta) and scaled time (the
//! delta multiplied by the time scale). Timers measure against whichever
//! [`ClockSource`] they were registered with.

use cadence_core::{ClockSource, TickId};

/// Accumulated scaled and real time plus the current tick number.
#[derive(Clone, Debug)]
pub struct TickClock {
    scaled: f64,
    real: f64,
    time_scale: f64,
    tick: TickId,
}

impl TickClock {
    /// A clock at time zero, before the first tick.
    pub fn new(time_scale: f64) -> Self {
        Self {
            scaled: 0.0,
            real: 0.0,
            time_scale,
            tick: TickId(0),
        }
    }

    /// Seconds elapsed on the given timeline.
    pub fn now(&self, source: ClockSource) -> f64 {
        match source {
            ClockSource::Scaled => self.scaled,
            ClockSource::Real => self.real,
        }
    }

    /// The most recently started tick. `TickId(0)` before the first tick.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// Multiplier applied to real deltas to produce scaled time.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub(crate) fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale;
    }

    /// Start a new tick, advancing both timelines by `real_dt` seconds.
    ///
    /// Negative or non-finite deltas advance the tick counter but no time.
    pub(crate) fn advance(&mut self, real_dt: f64) {
        let dt = if real_dt.is_finite() && real_dt >= 0.0 {
            real_dt
        } else {
            tracing::warn!(real_dt, "ignoring invalid frame delta");
            0.0
        };
        self.real += dt;
        self.scaled += dt * self.time_scale;
        self.tick = self.tick.next();
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let clock = TickClock::default();
        assert_eq!(clock.tick(), TickId(0));
        assert_eq!(clock.now(ClockSource::Real), 0.0);
        assert_eq!(clock.now(ClockSource::Scaled), 0.0);
    }

    #[test]
    fn scaled_time_follows_scale() {
        let mut clock = TickClock::new(0.5);
        clock.advance(1.0);
        clock.set_time_scale(2.0);
        clock.advance(1.0);
        assert_eq!(clock.tick(), TickId(2));
        assert_eq!(clock.now(ClockSource::Real), 2.0);
        assert_eq!(clock.now(ClockSource::Scaled), 2.5);
    }

    #[test]
    fn zero_scale_freezes_game_time_only() {
        let mut clock = TickClock::new(0.0);
        clock.advance(0.25);
        assert_eq!(clock.now(ClockSource::Scaled), 0.0);
        assert_eq!(clock.now(ClockSource::Real), 0.25);
    }

    #[test]
    fn invalid_delta_still_counts_tick() {
        let mut clock = TickClock::default();
        clock.advance(f64::NAN);
        clock.advance(-1.0);
        assert_eq!(clock.tick(), TickId(2));
        assert_eq!(clock.now(ClockSource::Real), 0.0);
    }
}
