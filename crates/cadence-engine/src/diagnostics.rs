//! Registration hooks and inspection types for debuggers.
//!
//! Nothing here is on the correctness path: a scheduler with no listener
//! behaves identically. Every registration records the caller's source
//! location (via `#[track_caller]`) as an [`Origin`], which listeners and
//! [`Scheduler::snapshot()`](crate::Scheduler::snapshot) expose.

use std::fmt;
use std::panic::Location;

use cadence_core::ClockSource;

use crate::handle::ScheduleHandle;
use crate::work::WorkStatus;

/// Source location of the code that scheduled a work item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Origin(&'static Location<'static>);

impl Origin {
    pub(crate) fn new(location: &'static Location<'static>) -> Self {
        Self(location)
    }

    /// Source file of the registering call.
    pub fn file(&self) -> &'static str {
        self.0.file()
    }

    /// Line of the registering call.
    pub fn line(&self) -> u32 {
        self.0.line()
    }

    /// Column of the registering call.
    pub fn column(&self) -> u32 {
        self.0.column()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which variant a work item is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkKindTag {
    /// Time-based countdown.
    Timer,
    /// Tick-based counter.
    FrameCounter,
}

/// Static description of a work item, fixed at registration.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkInfo {
    /// Variant of the item.
    pub kind: WorkKindTag,
    /// Duration in seconds (timers) or frames (frame counters).
    pub target: f64,
    /// Whether the item restarts after each completion.
    pub looped: bool,
    /// Clock a timer measures against; `None` for frame counters.
    pub source: Option<ClockSource>,
    /// Where the item was scheduled from.
    pub origin: Origin,
}

/// Point-in-time view of one scheduled item.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkSnapshot {
    /// Handle of the item.
    pub handle: ScheduleHandle,
    /// Registration-time description.
    pub info: WorkInfo,
    /// Lifecycle status at snapshot time.
    pub status: WorkStatus,
    /// Progress in seconds or frames.
    pub elapsed: f64,
    /// Whether the item is still waiting to join the active list.
    pub pending: bool,
}

/// Observer of registrations and disposals.
///
/// Called synchronously from the scheduler. Implementations must not
/// assume anything about when in the tick they are invoked.
pub trait ScheduleListener {
    /// A work item was registered.
    fn on_register(&mut self, handle: ScheduleHandle, info: &WorkInfo);

    /// A work item was disposed. `status` is its final status.
    fn on_unregister(&mut self, handle: ScheduleHandle, status: WorkStatus);
}
