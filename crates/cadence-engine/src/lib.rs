//! Cooperative tick scheduler for Cadence.
//!
//! Provides the [`Scheduler`] that advances timers and frame counters once
//! per host frame, fires their callbacks, and recycles finished items
//! through a serial-stamped task table. Work is described with a
//! [`Schedule`] builder and referenced afterwards by a copyable
//! [`ScheduleHandle`] that goes inert once its item is disposed.
//!
//! # Architecture
//!
//! ```text
//! Scheduler
//! ├── TickClock                    (scaled + real time, tick counter)
//! ├── HandleRegistry<ScheduledWork> (task table)
//! ├── active: Vec<ScheduleHandle>   (advance order)
//! ├── pending: Vec<ScheduleHandle>  (registration order, lazily pruned)
//! └── ScheduleListener              (optional diagnostics)
//! ```
//!
//! Single-threaded by construction: callbacks are `!Send` closures that
//! receive `&mut Scheduler`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod handle;
pub mod metrics;
pub mod schedule;
pub mod scheduler;
pub mod work;

pub use clock::TickClock;
pub use config::SchedulerConfig;
pub use diagnostics::{Origin, ScheduleListener, WorkInfo, WorkKindTag, WorkSnapshot};
pub use handle::ScheduleHandle;
pub use metrics::TickMetrics;
pub use schedule::{AliveFn, CompleteFn, Delay, Schedule, UpdateFn};
pub use scheduler::{Scheduler, TickPhase};
pub use work::{FrameCounter, ScheduledWork, Timer, WorkKind, WorkStatus};
