//! Registration requests.
//!
//! A [`Schedule`] describes one unit of deferred work before it is handed
//! to [`Scheduler::register()`](crate::Scheduler::register). It is built
//! fluently:
//!
//! ```ignore
//! let handle = scheduler.register(
//!     Schedule::seconds(1.5)
//!         .real_time()
//!         .on_update(|_, elapsed| println!("{elapsed:.2}s"))
//!         .on_complete(|_| println!("done")),
//! )?;
//! ```

use std::fmt;

use cadence_core::{ClockSource, SchedulerError};

use crate::scheduler::Scheduler;

/// Per-tick progress callback. Receives the elapsed seconds (timers) or
/// elapsed frames (frame counters).
pub type UpdateFn = Box<dyn FnMut(&mut Scheduler, f64)>;

/// Completion callback. Fires once per completed cycle.
pub type CompleteFn = Box<dyn FnMut(&mut Scheduler)>;

/// Owner liveness predicate checked before every update.
pub type AliveFn = Box<dyn Fn() -> bool>;

/// How long to wait before completing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Delay {
    /// A countdown in seconds on the chosen clock.
    Seconds(f64),
    /// A number of scheduler ticks.
    Frames(u64),
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seconds(s) => write!(f, "{s}s"),
            Self::Frames(n) => write!(f, "{n} frames"),
        }
    }
}

/// Builder for a unit of scheduled work.
pub struct Schedule {
    pub(crate) delay: Delay,
    pub(crate) looped: bool,
    pub(crate) source: ClockSource,
    pub(crate) on_update: Option<UpdateFn>,
    pub(crate) on_complete: Option<CompleteFn>,
    pub(crate) alive: Option<AliveFn>,
}

impl Schedule {
    /// Complete after `delay`.
    pub fn after(delay: Delay) -> Self {
        Self {
            delay,
            looped: false,
            source: ClockSource::Scaled,
            on_update: None,
            on_complete: None,
            alive: None,
        }
    }

    /// Complete after `seconds` of scaled time.
    pub fn seconds(seconds: f64) -> Self {
        Self::after(Delay::Seconds(seconds))
    }

    /// Complete after `frames` ticks.
    pub fn frames(frames: u64) -> Self {
        Self::after(Delay::Frames(frames))
    }

    /// Restart after each completion instead of terminating.
    pub fn looped(mut self) -> Self {
        self.looped = true;
        self
    }

    /// Measure a timer against unscaled real time. No effect on frames.
    pub fn real_time(mut self) -> Self {
        self.source = ClockSource::Real;
        self
    }

    /// Called every tick the work advances, before any completion.
    pub fn on_update(mut self, f: impl FnMut(&mut Scheduler, f64) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    /// Called when the delay elapses. Never called after cancellation.
    pub fn on_complete(mut self, f: impl FnMut(&mut Scheduler) + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Bind the work to an owner. Once `alive` returns `false` the work
    /// terminates silently on its next update, without any callback.
    pub fn while_alive(mut self, alive: impl Fn() -> bool + 'static) -> Self {
        self.alive = Some(Box::new(alive));
        self
    }

    /// The configured delay.
    pub fn delay(&self) -> Delay {
        self.delay
    }

    pub(crate) fn validate(&self) -> Result<(), SchedulerError> {
        match self.delay {
            Delay::Seconds(seconds) if !seconds.is_finite() || seconds < 0.0 => {
                Err(SchedulerError::InvalidDelay { seconds })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schedule")
            .field("delay", &self.delay)
            .field("looped", &self.looped)
            .field("source", &self.source)
            .field("on_update", &self.on_update.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("alive", &self.alive.is_some())
            .finish()
    }
}
