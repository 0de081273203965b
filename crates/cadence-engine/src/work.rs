//! Scheduled work items: timers and frame counters.
//!
//! [`ScheduledWork`] is a closed set of two variants sharing one lifecycle:
//!
//! ```text
//!            pause            resume
//!   Active ─────────▶ Paused ─────────▶ Active
//!     │  \                │
//!     │   \ cancel        │ cancel
//!     │    ▼              ▼
//!     │   Cancelled ◀─────┘
//!     │ delay elapsed (not looped) / owner gone
//!     ▼
//!   Completed
//! ```
//!
//! Timers never accumulate paused time separately. Pausing records the
//! instant progress halted; resuming shifts `start_time` forward by the
//! halted interval, so `elapsed = now - start_time` stays correct.

use std::fmt;

use cadence_core::{ClockSource, TickId};

use crate::clock::TickClock;
use crate::diagnostics::{Origin, WorkInfo, WorkKindTag};
use crate::schedule::{AliveFn, CompleteFn, Delay, Schedule, UpdateFn};

/// Lifecycle status of a work item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkStatus {
    /// Advancing every tick.
    Active,
    /// Registered but not advancing.
    Paused,
    /// Stopped before completion. The completion callback never fires.
    Cancelled,
    /// Finished naturally (or its owner went away).
    Completed,
}

impl WorkStatus {
    /// Whether the item will never advance again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Paused => write!(f, "paused"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Countdown against a clock.
#[derive(Clone, Debug)]
pub struct Timer {
    start_time: f64,
    duration: f64,
    source: ClockSource,
    /// Clock reading at which progress stopped (paused or terminal).
    halted_at: Option<f64>,
}

impl Timer {
    fn new(duration: f64, source: ClockSource, now: f64) -> Self {
        Self {
            start_time: now,
            duration,
            source,
            halted_at: None,
        }
    }

    /// Configured duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Clock this timer measures against.
    pub fn source(&self) -> ClockSource {
        self.source
    }

    fn elapsed(&self, clock: &TickClock) -> f64 {
        self.halted_at.unwrap_or_else(|| clock.now(self.source)) - self.start_time
    }

    fn halt(&mut self, clock: &TickClock) {
        if self.halted_at.is_none() {
            self.halted_at = Some(clock.now(self.source));
        }
    }
}

/// Counter of ticks.
#[derive(Clone, Debug)]
pub struct FrameCounter {
    tick_count: u64,
    frames: u64,
}

impl FrameCounter {
    /// Ticks counted in the current cycle.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Configured frame target.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Variant-specific progress.
#[derive(Clone, Debug)]
pub enum WorkKind {
    /// Time-based countdown.
    Timer(Timer),
    /// Tick-based counter.
    FrameCounter(FrameCounter),
}

#[derive(Default)]
pub(crate) struct Callbacks {
    pub(crate) on_update: Option<UpdateFn>,
    pub(crate) on_complete: Option<CompleteFn>,
}

/// Outcome of one [`ScheduledWork::update()`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Step {
    /// Not advanced: paused, terminal, or deferred to a later tick.
    Skipped,
    /// The owner guard failed; the item is now `Completed`.
    Expired,
    /// Advanced. `completes` is set when the delay has elapsed.
    Progress { elapsed: f64, completes: bool },
}

/// A unit of deferred work owned by the scheduler.
pub struct ScheduledWork {
    kind: WorkKind,
    status: WorkStatus,
    looped: bool,
    /// First tick on which this item may advance.
    first_tick: TickId,
    /// Buffered between ticks, not yet in the active list.
    pending: bool,
    callbacks: Callbacks,
    alive: Option<AliveFn>,
    origin: Origin,
}

impl ScheduledWork {
    pub(crate) fn new(
        schedule: Schedule,
        clock: &TickClock,
        first_tick: TickId,
        origin: Origin,
    ) -> Self {
        let kind = match schedule.delay {
            Delay::Seconds(seconds) => WorkKind::Timer(Timer::new(
                seconds,
                schedule.source,
                clock.now(schedule.source),
            )),
            Delay::Frames(frames) => WorkKind::FrameCounter(FrameCounter {
                tick_count: 0,
                frames,
            }),
        };
        Self {
            kind,
            status: WorkStatus::Active,
            looped: schedule.looped,
            first_tick,
            pending: false,
            callbacks: Callbacks {
                on_update: schedule.on_update,
                on_complete: schedule.on_complete,
            },
            alive: schedule.alive,
            origin,
        }
    }

    /// Advance progress by one tick.
    ///
    /// Does not fire callbacks or mark completion; the scheduler does that
    /// after running `on_update`, so a cancel from inside the callback can
    /// still suppress completion.
    pub(crate) fn update(&mut self, clock: &TickClock) -> Step {
        if self.status != WorkStatus::Active || clock.tick() < self.first_tick {
            return Step::Skipped;
        }
        if self.alive.as_ref().is_some_and(|alive| !alive()) {
            self.terminate(WorkStatus::Completed, clock);
            return Step::Expired;
        }
        match &mut self.kind {
            WorkKind::Timer(timer) => {
                let elapsed = clock.now(timer.source) - timer.start_time;
                Step::Progress {
                    elapsed,
                    completes: elapsed >= timer.duration,
                }
            }
            WorkKind::FrameCounter(counter) => {
                counter.tick_count += 1;
                Step::Progress {
                    elapsed: counter.tick_count as f64,
                    completes: counter.tick_count >= counter.frames,
                }
            }
        }
    }

    /// Finish the current cycle: restart if looped, else mark `Completed`.
    pub(crate) fn complete(&mut self, clock: &TickClock) {
        if !self.looped {
            self.terminate(WorkStatus::Completed, clock);
            return;
        }
        match &mut self.kind {
            WorkKind::Timer(timer) => {
                timer.start_time = clock.now(timer.source);
                timer.halted_at = None;
            }
            WorkKind::FrameCounter(counter) => counter.tick_count = 0,
        }
    }

    /// Stop advancing. Idempotent; no-op unless `Active`.
    pub(crate) fn pause(&mut self, clock: &TickClock) {
        if self.status != WorkStatus::Active {
            return;
        }
        self.status = WorkStatus::Paused;
        if let WorkKind::Timer(timer) = &mut self.kind {
            timer.halt(clock);
        }
    }

    /// Continue advancing. No-op unless `Paused`.
    pub(crate) fn resume(&mut self, clock: &TickClock) {
        if self.status != WorkStatus::Paused {
            return;
        }
        self.status = WorkStatus::Active;
        if let WorkKind::Timer(timer) = &mut self.kind {
            if let Some(halted_at) = timer.halted_at.take() {
                timer.start_time += clock.now(timer.source) - halted_at;
            }
        }
    }

    /// Stop for good without completing. No-op once terminal.
    pub(crate) fn cancel(&mut self, clock: &TickClock) {
        if !self.status.is_terminal() {
            self.terminate(WorkStatus::Cancelled, clock);
        }
    }

    fn terminate(&mut self, status: WorkStatus, clock: &TickClock) {
        self.status = status;
        if let WorkKind::Timer(timer) = &mut self.kind {
            timer.halt(clock);
        }
    }

    pub(crate) fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    pub(crate) fn take_callbacks(&mut self) -> Callbacks {
        std::mem::take(&mut self.callbacks)
    }

    pub(crate) fn restore_callbacks(&mut self, callbacks: Callbacks) {
        self.callbacks = callbacks;
    }

    /// Current lifecycle status.
    pub fn status(&self) -> WorkStatus {
        self.status
    }

    /// Whether the item is terminal.
    pub fn is_done(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether the item is paused.
    pub fn is_paused(&self) -> bool {
        self.status == WorkStatus::Paused
    }

    /// Whether the item is still waiting to join the active list.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Whether the item restarts after completing.
    pub fn is_looped(&self) -> bool {
        self.looped
    }

    /// Variant-specific state.
    pub fn kind(&self) -> &WorkKind {
        &self.kind
    }

    /// Progress in the current cycle: seconds for timers, frames for
    /// frame counters.
    pub fn elapsed(&self, clock: &TickClock) -> f64 {
        match &self.kind {
            WorkKind::Timer(timer) => timer.elapsed(clock),
            WorkKind::FrameCounter(counter) => counter.tick_count as f64,
        }
    }

    /// Progress left before the current cycle completes, never negative.
    pub fn remaining(&self, clock: &TickClock) -> f64 {
        match &self.kind {
            WorkKind::Timer(timer) => (timer.duration - timer.elapsed(clock)).max(0.0),
            WorkKind::FrameCounter(counter) => {
                counter.frames.saturating_sub(counter.tick_count) as f64
            }
        }
    }

    /// Registration-time description.
    pub fn info(&self) -> WorkInfo {
        let (kind, target, source) = match &self.kind {
            WorkKind::Timer(timer) => (WorkKindTag::Timer, timer.duration, Some(timer.source)),
            WorkKind::FrameCounter(counter) => {
                (WorkKindTag::FrameCounter, counter.frames as f64, None)
            }
        };
        WorkInfo {
            kind,
            target,
            looped: self.looped,
            source,
            origin: self.origin,
        }
    }
}

impl fmt::Debug for ScheduledWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledWork")
            .field("kind", &self.kind)
            .field("status", &self.status)
            .field("looped", &self.looped)
            .field("first_tick", &self.first_tick)
            .field("pending", &self.pending)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::panic::Location;
    use std::rc::Rc;

    fn origin() -> Origin {
        Origin::new(Location::caller())
    }

    /// Work registered before `clock`'s next tick.
    fn work(schedule: Schedule, clock: &TickClock) -> ScheduledWork {
        ScheduledWork::new(schedule, clock, clock.tick().next(), origin())
    }

    fn progress(step: Step) -> (f64, bool) {
        match step {
            Step::Progress { elapsed, completes } => (elapsed, completes),
            other => panic!("expected progress, got {other:?}"),
        }
    }

    #[test]
    fn timer_completes_when_elapsed_reaches_duration() {
        let mut clock = TickClock::default();
        let mut w = work(Schedule::seconds(1.0), &clock);
        clock.advance(0.5);
        assert_eq!(progress(w.update(&clock)), (0.5, false));
        clock.advance(0.5);
        assert_eq!(progress(w.update(&clock)), (1.0, true));
        w.complete(&clock);
        assert_eq!(w.status(), WorkStatus::Completed);
        assert_eq!(w.update(&clock), Step::Skipped);
    }

    #[test]
    fn looped_timer_restarts_from_completion_time() {
        let mut clock = TickClock::default();
        let mut w = work(Schedule::seconds(1.0).looped(), &clock);
        clock.advance(1.25);
        assert!(progress(w.update(&clock)).1);
        w.complete(&clock);
        assert_eq!(w.status(), WorkStatus::Active);
        assert_eq!(w.elapsed(&clock), 0.0);
        clock.advance(0.5);
        assert_eq!(progress(w.update(&clock)), (0.5, false));
    }

    #[test]
    fn pause_shifts_start_time() {
        let mut clock = TickClock::default();
        let mut w = work(Schedule::seconds(2.0), &clock);
        clock.advance(0.5);
        w.update(&clock);
        w.pause(&clock);
        clock.advance(10.0);
        assert_eq!(w.update(&clock), Step::Skipped);
        assert_eq!(w.elapsed(&clock), 0.5);
        w.resume(&clock);
        clock.advance(0.5);
        assert_eq!(progress(w.update(&clock)), (1.0, false));
        assert_eq!(w.remaining(&clock), 1.0);
    }

    #[test]
    fn pause_is_idempotent_and_resume_of_active_is_noop() {
        let mut clock = TickClock::default();
        let mut w = work(Schedule::seconds(2.0), &clock);
        w.resume(&clock);
        assert_eq!(w.status(), WorkStatus::Active);
        clock.advance(0.5);
        w.pause(&clock);
        clock.advance(0.5);
        w.pause(&clock);
        assert!(w.is_paused());
        assert_eq!(w.elapsed(&clock), 0.5);
        w.resume(&clock);
        clock.advance(0.25);
        assert_eq!(w.elapsed(&clock), 0.75);
    }

    #[test]
    fn cancel_freezes_progress() {
        let mut clock = TickClock::default();
        let mut w = work(Schedule::seconds(1.0), &clock);
        clock.advance(0.25);
        w.cancel(&clock);
        clock.advance(5.0);
        assert_eq!(w.status(), WorkStatus::Cancelled);
        assert_eq!(w.elapsed(&clock), 0.25);
        assert_eq!(w.update(&clock), Step::Skipped);
        w.resume(&clock);
        assert_eq!(w.status(), WorkStatus::Cancelled);
    }

    #[test]
    fn cancel_after_completion_keeps_completed() {
        let mut clock = TickClock::default();
        let mut w = work(Schedule::frames(1), &clock);
        clock.advance(0.1);
        assert!(progress(w.update(&clock)).1);
        w.complete(&clock);
        w.cancel(&clock);
        assert_eq!(w.status(), WorkStatus::Completed);
    }

    #[test]
    fn frame_counter_counts_ticks_not_time() {
        let mut clock = TickClock::default();
        let mut w = work(Schedule::frames(3), &clock);
        for expected in 1..=2u64 {
            clock.advance(100.0);
            assert_eq!(progress(w.update(&clock)), (expected as f64, false));
        }
        clock.advance(0.0);
        assert_eq!(progress(w.update(&clock)), (3.0, true));
    }

    #[test]
    fn paused_frame_counter_skips_increment() {
        let mut clock = TickClock::default();
        let mut w = work(Schedule::frames(2), &clock);
        w.pause(&clock);
        clock.advance(0.1);
        assert_eq!(w.update(&clock), Step::Skipped);
        w.resume(&clock);
        clock.advance(0.1);
        assert_eq!(progress(w.update(&clock)), (1.0, false));
        assert_eq!(w.remaining(&clock), 1.0);
    }

    #[test]
    fn looped_frame_counter_resets() {
        let mut clock = TickClock::default();
        let mut w = work(Schedule::frames(2).looped(), &clock);
        for _ in 0..2 {
            clock.advance(0.1);
            w.update(&clock);
        }
        w.complete(&clock);
        assert_eq!(w.elapsed(&clock), 0.0);
        assert!(w.is_looped());
    }

    #[test]
    fn deferred_until_first_tick() {
        let mut clock = TickClock::default();
        clock.advance(0.1);
        // Registered mid-tick 1: may not advance until tick 2.
        let mut w = ScheduledWork::new(Schedule::frames(1), &clock, TickId(2), origin());
        assert_eq!(w.update(&clock), Step::Skipped);
        clock.advance(0.1);
        assert!(progress(w.update(&clock)).1);
    }

    #[test]
    fn dead_owner_expires_silently() {
        let alive = Rc::new(Cell::new(true));
        let flag = Rc::clone(&alive);
        let mut clock = TickClock::default();
        let mut w = work(Schedule::seconds(5.0).while_alive(move || flag.get()), &clock);
        clock.advance(1.0);
        assert!(matches!(w.update(&clock), Step::Progress { .. }));
        alive.set(false);
        clock.advance(1.0);
        assert_eq!(w.update(&clock), Step::Expired);
        assert_eq!(w.status(), WorkStatus::Completed);
    }

    #[test]
    fn real_time_timer_ignores_time_scale() {
        let mut clock = TickClock::new(0.0);
        let mut scaled = work(Schedule::seconds(1.0), &clock);
        let mut real = work(Schedule::seconds(1.0).real_time(), &clock);
        clock.advance(1.0);
        assert_eq!(progress(scaled.update(&clock)), (0.0, false));
        assert_eq!(progress(real.update(&clock)), (1.0, true));
    }

    #[test]
    fn info_describes_variant() {
        let clock = TickClock::default();
        let t = work(Schedule::seconds(2.5).real_time(), &clock).info();
        assert_eq!(t.kind, WorkKindTag::Timer);
        assert_eq!(t.target, 2.5);
        assert_eq!(t.source, Some(ClockSource::Real));
        let f = work(Schedule::frames(7).looped(), &clock).info();
        assert_eq!(f.kind, WorkKindTag::FrameCounter);
        assert_eq!(f.target, 7.0);
        assert!(f.looped);
        assert_eq!(f.source, None);
    }
}
