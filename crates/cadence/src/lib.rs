//! Cadence: generational handle registries and a cooperative tick
//! scheduler for game loops.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Cadence sub-crates. For most users, adding `cadence` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use cadence::prelude::*;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let mut scheduler = Scheduler::new();
//! let fired = Rc::new(Cell::new(false));
//! let flag = Rc::clone(&fired);
//! let handle = scheduler
//!     .register(Schedule::seconds(0.5).on_complete(move |_| flag.set(true)))
//!     .unwrap();
//!
//! // Host loop: one call per frame.
//! for _ in 0..40 {
//!     scheduler.advance_one_tick(1.0 / 60.0);
//! }
//! assert!(fired.get());
//! assert!(handle.is_done(&scheduler));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `cadence-core` | `Handle`, `TickId`, `ClockSource`, error types |
//! | [`arena`] | `cadence-arena` | Generational arena and handle registries |
//! | [`engine`] | `cadence-engine` | Scheduler, work items, diagnostics |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and errors (`cadence-core`).
///
/// Contains the packed [`types::Handle`], [`types::TickId`] and the error
/// enums shared by every sub-crate.
pub use cadence_core as types;

/// Slot storage and handle registries (`cadence-arena`).
///
/// [`arena::HandleRegistry`] for validated O(1) lookup and
/// [`arena::ObjectRegistry`] for tables that need bulk cleanup.
pub use cadence_arena as arena;

/// The tick scheduler (`cadence-engine`).
///
/// [`engine::Scheduler`] owns all scheduled work; [`engine::Schedule`]
/// describes it; [`engine::ScheduleHandle`] refers to it.
pub use cadence_engine as engine;

/// Common imports for typical Cadence usage.
///
/// ```rust
/// use cadence::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use cadence_core::{ClockSource, Handle, TickId};

    // Errors
    pub use cadence_core::{ArenaError, ConfigError, SchedulerError};

    // Registries
    pub use cadence_arena::{ArenaConfig, HandleRegistry, ObjectRegistry};

    // Engine
    pub use cadence_engine::{
        Delay, Schedule, ScheduleHandle, ScheduleListener, Scheduler, SchedulerConfig,
        TickMetrics, WorkStatus,
    };
}
