//! Caller-facing handle to scheduled work.
//!
//! A [`ScheduleHandle`] is a capability to observe and stop one work item.
//! It owns nothing: the scheduler reclaims finished items on its own, and
//! every operation on a handle whose item is gone is a silent no-op.

use std::fmt;

use cadence_core::Handle;

use crate::scheduler::Scheduler;
use crate::work::WorkStatus;

/// Opaque `{serial, index}` reference to a scheduled work item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScheduleHandle(Handle);

impl ScheduleHandle {
    /// A handle that never refers to anything.
    pub const NONE: Self = Self(Handle::NONE);

    pub(crate) fn new(raw: Handle) -> Self {
        Self(raw)
    }

    /// The underlying registry handle.
    pub fn raw(self) -> Handle {
        self.0
    }

    /// Whether the item still exists in `scheduler`.
    pub fn is_valid(self, scheduler: &Scheduler) -> bool {
        scheduler.is_valid(self)
    }

    /// Whether the item has finished, been cancelled, or no longer exists.
    pub fn is_done(self, scheduler: &Scheduler) -> bool {
        scheduler.is_done(self)
    }

    /// Whether the item exists and is paused.
    pub fn is_paused(self, scheduler: &Scheduler) -> bool {
        scheduler.status(self) == Some(WorkStatus::Paused)
    }

    /// Current status, or `None` once the item has been disposed.
    pub fn status(self, scheduler: &Scheduler) -> Option<WorkStatus> {
        scheduler.status(self)
    }

    /// Progress of the current cycle in seconds or frames.
    pub fn elapsed(self, scheduler: &Scheduler) -> Option<f64> {
        scheduler.elapsed(self)
    }

    /// Progress left in the current cycle in seconds or frames.
    pub fn remaining(self, scheduler: &Scheduler) -> Option<f64> {
        scheduler.remaining(self)
    }

    /// Stop the item without completing it.
    pub fn cancel(self, scheduler: &mut Scheduler) {
        scheduler.cancel(self);
    }

    /// Suspend the item.
    pub fn pause(self, scheduler: &mut Scheduler) {
        scheduler.pause(self);
    }

    /// Continue a paused item.
    pub fn resume(self, scheduler: &mut Scheduler) {
        scheduler.resume(self);
    }

    /// Same as [`cancel()`](Self::cancel). Not required to avoid leaks.
    pub fn dispose(self, scheduler: &mut Scheduler) {
        scheduler.cancel(self);
    }
}

impl fmt::Display for ScheduleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}.{}", self.0.index(), self.0.serial())
    }
}
