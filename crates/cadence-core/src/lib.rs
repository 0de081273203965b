//! Core types for the Cadence scheduler.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! packed [`Handle`] shared by every registry, the tick and clock
//! identifiers, and the error enums used across the workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod handle;
pub mod id;

pub use error::{ArenaError, ConfigError, SchedulerError};
pub use handle::{Handle, MAX_INDEX, MAX_SERIAL};
pub use id::{ClockSource, TickId};
