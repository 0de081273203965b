//! The cooperative run loop.
//!
//! [`Scheduler`] owns every scheduled work item and advances them once per
//! call to [`advance_one_tick()`](Scheduler::advance_one_tick). Each tick
//! runs four phases:
//!
//! ```text
//! Idle ──▶ Draining ──▶ Advancing ──▶ Sweeping ──▶ Idle
//!          pending →     update each    dispose
//!          active        active item    terminal items
//! ```
//!
//! Callbacks receive `&mut Scheduler` and may register, cancel, pause or
//! resume work mid-tick. The active list is only ever appended to while
//! Advancing, and terminal items are removed in the Sweeping phase, so
//! re-entrant mutation never skips or double-advances an item.
//!
//! # Registration timing
//!
//! - Between ticks: the item is buffered as pending and joins the active
//!   list at the next Draining phase. It is advanced on that same tick.
//! - During Advancing (from a callback): the item is appended to the
//!   active list directly but may not advance until the next tick.
//!
//! # Lifecycle violations
//!
//! Registering after [`shutdown()`](Scheduler::shutdown), and calling
//! `advance_one_tick()` from inside a callback, are programmer errors and
//! panic.

use std::fmt;
use std::panic::Location;
use std::time::Instant;

use cadence_arena::HandleRegistry;
use cadence_core::{ClockSource, ConfigError, SchedulerError, TickId};
use smallvec::SmallVec;

use crate::clock::TickClock;
use crate::config::{validate_time_scale, SchedulerConfig};
use crate::diagnostics::{Origin, ScheduleListener, WorkSnapshot};
use crate::handle::ScheduleHandle;
use crate::metrics::TickMetrics;
use crate::schedule::{Delay, Schedule};
use crate::work::{ScheduledWork, Step, WorkStatus};

// ── TickPhase ───────────────────────────────────────────────────

/// Where the scheduler is within a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickPhase {
    /// Between ticks.
    Idle,
    /// Merging pending registrations into the active list.
    Draining,
    /// Updating active items and running their callbacks.
    Advancing,
    /// Disposing items whose status became terminal.
    Sweeping,
}

enum Advanced {
    Skipped,
    Expired,
    Updated,
    Completed,
}

// ── Scheduler ───────────────────────────────────────────────────

/// Single-threaded scheduler for timers and frame counters.
///
/// Owned by the host loop and passed by reference to whatever needs to
/// schedule work. Dropping it performs [`shutdown()`](Self::shutdown).
pub struct Scheduler {
    tasks: HandleRegistry<ScheduledWork>,
    active: Vec<ScheduleHandle>,
    /// Registration order. May hold handles of pending items that were
    /// cancelled since; those are dropped while draining.
    pending: Vec<ScheduleHandle>,
    pending_live: usize,
    clock: TickClock,
    phase: TickPhase,
    shut_down: bool,
    deferred_this_tick: usize,
    listener: Option<Box<dyn ScheduleListener>>,
    last_metrics: TickMetrics,
}

impl Scheduler {
    /// Create a scheduler with the default configuration.
    pub fn new() -> Self {
        Self::from_parts(HandleRegistry::new(), 1.0)
    }

    /// Create a scheduler from a [`SchedulerConfig`].
    pub fn with_config(config: SchedulerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let tasks = HandleRegistry::with_config(&config.tasks)?;
        Ok(Self::from_parts(tasks, config.time_scale))
    }

    fn from_parts(tasks: HandleRegistry<ScheduledWork>, time_scale: f64) -> Self {
        Self {
            tasks,
            active: Vec::new(),
            pending: Vec::new(),
            pending_live: 0,
            clock: TickClock::new(time_scale),
            phase: TickPhase::Idle,
            shut_down: false,
            deferred_this_tick: 0,
            listener: None,
            last_metrics: TickMetrics::default(),
        }
    }

    // ── Registration ────────────────────────────────────────────

    /// Register a unit of work and return its handle.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::InvalidDelay`] for a negative or non-finite
    /// duration; [`SchedulerError::Capacity`] if the task table is full.
    ///
    /// # Panics
    ///
    /// Panics if called after [`shutdown()`](Self::shutdown).
    #[track_caller]
    pub fn register(&mut self, schedule: Schedule) -> Result<ScheduleHandle, SchedulerError> {
        let origin = Origin::new(Location::caller());
        assert!(
            !self.shut_down,
            "work registered after scheduler shutdown (from {origin})"
        );
        schedule.validate()?;
        let delay = schedule.delay();
        let mid_tick = self.phase == TickPhase::Advancing;
        let mut work = ScheduledWork::new(schedule, &self.clock, self.clock.tick().next(), origin);
        work.set_pending(!mid_tick);
        let info = work.info();
        let handle = ScheduleHandle::new(self.tasks.register(work)?);

        if mid_tick {
            self.active.push(handle);
            self.deferred_this_tick += 1;
        } else {
            self.pending.push(handle);
            self.pending_live += 1;
        }

        tracing::debug!(%handle, %delay, %origin, "work registered");
        if let Some(listener) = self.listener.as_mut() {
            listener.on_register(handle, &info);
        }
        Ok(handle)
    }

    /// Run `on_complete` once after `delay`.
    #[track_caller]
    pub fn schedule_after(
        &mut self,
        delay: Delay,
        on_complete: impl FnMut(&mut Scheduler) + 'static,
    ) -> Result<ScheduleHandle, SchedulerError> {
        self.register(Schedule::after(delay).on_complete(on_complete))
    }

    // ── Handle operations ───────────────────────────────────────

    /// Cancel the item behind `handle`. No-op if the handle is stale.
    ///
    /// A pending item is disposed immediately; an active one is disposed
    /// by the next sweep.
    pub fn cancel(&mut self, handle: ScheduleHandle) {
        match self.tasks.resolve_mut(handle.raw()) {
            None => return,
            Some(work) if !work.is_pending() => {
                work.cancel(&self.clock);
                tracing::debug!(%handle, "work cancelled");
                return;
            }
            Some(_) => {}
        }
        // The stale entry left in `pending` is skipped when draining.
        if let Some(mut work) = self.tasks.unregister(handle.raw()) {
            work.cancel(&self.clock);
            self.pending_live -= 1;
            tracing::debug!(%handle, "pending work cancelled and disposed");
            self.notify_unregister(handle, work.status());
        }
    }

    /// Pause the item behind `handle`. No-op if stale or not active.
    pub fn pause(&mut self, handle: ScheduleHandle) {
        if let Some(work) = self.tasks.resolve_mut(handle.raw()) {
            work.pause(&self.clock);
        }
    }

    /// Resume the item behind `handle`. No-op if stale or not paused.
    pub fn resume(&mut self, handle: ScheduleHandle) {
        if let Some(work) = self.tasks.resolve_mut(handle.raw()) {
            work.resume(&self.clock);
        }
    }

    /// Cancel every active item and dispose every pending one.
    pub fn cancel_all(&mut self) {
        for handle in &self.active {
            if let Some(work) = self.tasks.resolve_mut(handle.raw()) {
                work.cancel(&self.clock);
            }
        }
        let pending = std::mem::take(&mut self.pending);
        self.pending_live = 0;
        for handle in pending {
            if let Some(mut work) = self.tasks.unregister(handle.raw()) {
                work.cancel(&self.clock);
                self.notify_unregister(handle, work.status());
            }
        }
        tracing::debug!(active = self.active.len(), "all work cancelled");
    }

    /// Pause every active item.
    pub fn pause_all(&mut self) {
        for handle in &self.active {
            if let Some(work) = self.tasks.resolve_mut(handle.raw()) {
                work.pause(&self.clock);
            }
        }
    }

    /// Resume every paused active item.
    pub fn resume_all(&mut self) {
        for handle in &self.active {
            if let Some(work) = self.tasks.resolve_mut(handle.raw()) {
                work.resume(&self.clock);
            }
        }
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Whether `handle` still refers to a registered item.
    pub fn is_valid(&self, handle: ScheduleHandle) -> bool {
        self.tasks.contains(handle.raw())
    }

    /// Whether the item is terminal or already disposed.
    pub fn is_done(&self, handle: ScheduleHandle) -> bool {
        self.tasks
            .resolve(handle.raw())
            .map_or(true, ScheduledWork::is_done)
    }

    /// Current status of a live item.
    pub fn status(&self, handle: ScheduleHandle) -> Option<WorkStatus> {
        self.tasks.resolve(handle.raw()).map(ScheduledWork::status)
    }

    /// Progress of a live item in seconds or frames.
    pub fn elapsed(&self, handle: ScheduleHandle) -> Option<f64> {
        self.tasks
            .resolve(handle.raw())
            .map(|work| work.elapsed(&self.clock))
    }

    /// Progress left for a live item in seconds or frames.
    pub fn remaining(&self, handle: ScheduleHandle) -> Option<f64> {
        self.tasks
            .resolve(handle.raw())
            .map(|work| work.remaining(&self.clock))
    }

    /// Where a live item was registered from.
    pub fn origin(&self, handle: ScheduleHandle) -> Option<Origin> {
        self.tasks.resolve(handle.raw()).map(|work| work.info().origin)
    }

    /// Read-only access to a live item.
    pub fn get(&self, handle: ScheduleHandle) -> Option<&ScheduledWork> {
        self.tasks.resolve(handle.raw())
    }

    /// Number of registered items (active + pending, including terminal
    /// items awaiting the sweep).
    pub fn len(&self) -> usize {
        self.tasks.count()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Items in the active list.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Items waiting to join the active list.
    pub fn pending_count(&self) -> usize {
        self.pending_live
    }

    /// The most recently started tick.
    pub fn current_tick(&self) -> TickId {
        self.clock.tick()
    }

    /// Current reading of the given clock.
    pub fn now(&self, source: ClockSource) -> f64 {
        self.clock.now(source)
    }

    /// The scheduler's clock.
    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    /// Current phase. `Idle` unless called from a callback.
    pub fn phase(&self) -> TickPhase {
        self.phase
    }

    /// Whether [`shutdown()`](Self::shutdown) has run.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Metrics from the most recent tick.
    pub fn last_metrics(&self) -> &TickMetrics {
        &self.last_metrics
    }

    /// Stable copy of every live item: active items in advance order,
    /// then pending items in registration order.
    pub fn snapshot(&self) -> Vec<WorkSnapshot> {
        let active = self.active.iter().map(|h| (*h, false));
        let pending = self.pending.iter().map(|h| (*h, true));
        active
            .chain(pending)
            .filter_map(|(handle, pending)| {
                let work = self.tasks.resolve(handle.raw())?;
                Some(WorkSnapshot {
                    handle,
                    info: work.info(),
                    status: work.status(),
                    elapsed: work.elapsed(&self.clock),
                    pending,
                })
            })
            .collect()
    }

    // ── Configuration ───────────────────────────────────────────

    /// Multiplier from real to scaled time.
    pub fn time_scale(&self) -> f64 {
        self.clock.time_scale()
    }

    /// Change the time scale for subsequent ticks.
    pub fn set_time_scale(&mut self, scale: f64) -> Result<(), ConfigError> {
        validate_time_scale(scale)?;
        self.clock.set_time_scale(scale);
        Ok(())
    }

    /// Install a diagnostics listener, replacing any previous one.
    pub fn set_listener(&mut self, listener: impl ScheduleListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Remove and return the diagnostics listener.
    pub fn take_listener(&mut self) -> Option<Box<dyn ScheduleListener>> {
        self.listener.take()
    }

    /// Release task-table slots freed since the table last grew.
    pub fn shrink_to_fit(&mut self) {
        self.tasks.shrink();
    }

    // ── Tick ────────────────────────────────────────────────────

    /// Run one tick, advancing the clocks by `dt` real seconds.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a scheduled callback or after
    /// [`shutdown()`](Self::shutdown).
    pub fn advance_one_tick(&mut self, dt: f64) -> TickMetrics {
        assert!(
            !self.shut_down,
            "advance_one_tick called after scheduler shutdown"
        );
        assert!(
            self.phase == TickPhase::Idle,
            "advance_one_tick re-entered during {:?}",
            self.phase
        );
        let tick_start = Instant::now();
        self.clock.advance(dt);
        let mut metrics = TickMetrics {
            tick: self.clock.tick(),
            ..TickMetrics::default()
        };

        // 1. Pending registrations join the active list in order.
        self.phase = TickPhase::Draining;
        metrics.drained = self.pending_live;
        self.pending_live = 0;
        let tasks = &mut self.tasks;
        self.active
            .extend(self.pending.drain(..).filter(|h| match tasks.resolve_mut(h.raw()) {
                Some(work) => {
                    work.set_pending(false);
                    true
                }
                None => false,
            }));

        // 2. Advance. Items appended by callbacks are covered by the
        //    length check but skip their update via `first_tick`.
        self.phase = TickPhase::Advancing;
        self.deferred_this_tick = 0;
        let mut i = 0;
        while i < self.active.len() {
            let handle = self.active[i];
            i += 1;
            match self.advance_item(handle) {
                Advanced::Skipped => {}
                Advanced::Expired => metrics.expired += 1,
                Advanced::Updated => metrics.advanced += 1,
                Advanced::Completed => {
                    metrics.advanced += 1;
                    metrics.completed += 1;
                }
            }
        }
        metrics.deferred = self.deferred_this_tick;

        // 3. Dispose terminal items.
        self.phase = TickPhase::Sweeping;
        metrics.swept = self.sweep();
        self.phase = TickPhase::Idle;

        metrics.active = self.active.len();
        metrics.total_us = tick_start.elapsed().as_micros() as u64;
        tracing::trace!(
            tick = %metrics.tick,
            drained = metrics.drained,
            advanced = metrics.advanced,
            completed = metrics.completed,
            swept = metrics.swept,
            active = metrics.active,
            "tick complete"
        );
        self.last_metrics = metrics.clone();
        metrics
    }

    fn advance_item(&mut self, handle: ScheduleHandle) -> Advanced {
        let Some(work) = self.tasks.resolve_mut(handle.raw()) else {
            return Advanced::Skipped;
        };
        let (elapsed, completes) = match work.update(&self.clock) {
            Step::Skipped => return Advanced::Skipped,
            Step::Expired => {
                tracing::debug!(%handle, "owner gone, work expired");
                return Advanced::Expired;
            }
            Step::Progress { elapsed, completes } => (elapsed, completes),
        };
        // Callbacks are checked out while they run so they can borrow the
        // scheduler mutably.
        let mut callbacks = work.take_callbacks();

        if let Some(on_update) = callbacks.on_update.as_mut() {
            on_update(self, elapsed);
        }

        // A cancel or pause issued from on_update suppresses completion.
        let completed = completes
            && match self.tasks.resolve_mut(handle.raw()) {
                Some(work) if work.status() == WorkStatus::Active => {
                    work.complete(&self.clock);
                    true
                }
                _ => false,
            };
        if completed {
            if let Some(on_complete) = callbacks.on_complete.as_mut() {
                on_complete(self);
            }
        }

        if let Some(work) = self.tasks.resolve_mut(handle.raw()) {
            work.restore_callbacks(callbacks);
        }
        if completed {
            Advanced::Completed
        } else {
            Advanced::Updated
        }
    }

    /// Two passes: collect terminal handles from a stable view of the
    /// active list, then remove and dispose them.
    fn sweep(&mut self) -> usize {
        let terminal: SmallVec<[ScheduleHandle; 16]> = self
            .active
            .iter()
            .copied()
            .filter(|h| {
                self.tasks
                    .resolve(h.raw())
                    .map_or(true, ScheduledWork::is_done)
            })
            .collect();
        if terminal.is_empty() {
            return 0;
        }

        let tasks = &self.tasks;
        self.active
            .retain(|h| tasks.resolve(h.raw()).is_some_and(|w| !w.is_done()));

        let mut swept = 0;
        for &handle in &terminal {
            if let Some(work) = self.tasks.unregister(handle.raw()) {
                tracing::debug!(%handle, status = %work.status(), "work disposed");
                self.notify_unregister(handle, work.status());
                swept += 1;
            }
        }
        swept
    }

    // ── Shutdown ────────────────────────────────────────────────

    /// Force-cancel every active and pending item and clear the task
    /// table. Idempotent. Any later registration panics.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.active.clear();
        self.pending.clear();
        self.pending_live = 0;
        let mut cancelled = 0usize;
        for (raw, mut work) in self.tasks.drain() {
            if !work.is_done() {
                work.cancel(&self.clock);
                cancelled += 1;
            }
            self.notify_unregister(ScheduleHandle::new(raw), work.status());
        }
        self.tasks.shrink();
        tracing::info!(cancelled, tick = %self.clock.tick(), "scheduler shut down");
    }

    fn notify_unregister(&mut self, handle: ScheduleHandle, status: WorkStatus) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_unregister(handle, status);
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("tick", &self.clock.tick())
            .field("phase", &self.phase)
            .field("active", &self.active.len())
            .field("pending", &self.pending_live)
            .field("registered", &self.tasks.count())
            .field("shut_down", &self.shut_down)
            .finish_non_exhaustive()
    }
}
