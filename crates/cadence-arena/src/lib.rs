//! Generational slot storage for Cadence.
//!
//! Provides the dense slot table and the serial-stamped handle registries
//! that back actor tables, global-object tables and the scheduler's task
//! table.
//!
//! # Architecture
//!
//! ```text
//! ObjectRegistry<T>      (bulk cleanup + listener notification)
//! └── HandleRegistry<T>  (serial counter, Handle validation)
//!     └── GenerationalArena<Stamped<T>>
//!         ├── Vec<Slot>    (Occupied(pos) | Free, doubly-linked free list)
//!         └── Vec<(u32, T)> (live values, packed)
//! ```
//!
//! Single-entry operations are O(1). Iteration and draining cost O(live
//! entries); shrinking costs O(trailing free slots).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod config;
pub mod objects;
pub mod registry;

pub use arena::GenerationalArena;
pub use config::ArenaConfig;
pub use objects::{CleanupListener, ObjectRegistry};
pub use registry::HandleRegistry;
