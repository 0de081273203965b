//! Error types for the Cadence workspace.
//!
//! One enum per subsystem. There is no stale-handle error: a handle that no
//! longer resolves surfaces as `None` or a no-op.

use thiserror::Error;

/// Errors from generational arena and registry operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ArenaError {
    /// The arena reached its configured hard capacity and cannot grow.
    #[error("arena capacity exceeded: {capacity} slots")]
    CapacityExceeded {
        /// The hard capacity that was hit.
        capacity: u32,
    },
    /// An index beyond the arena's allocated slot range.
    #[error("slot index {index} out of range (slot count {slot_count})")]
    IndexOutOfRange {
        /// The requested index.
        index: u32,
        /// Number of slots currently allocated.
        slot_count: u32,
    },
}

/// Errors from scheduler registration.
///
/// Lifecycle violations (registering after shutdown, re-entrant ticks) are
/// not represented here: they are programmer errors and panic.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SchedulerError {
    /// The backing task table could not allocate a slot.
    #[error("task table: {0}")]
    Capacity(#[from] ArenaError),
    /// A timer duration that is negative, NaN or infinite.
    #[error("invalid delay: {seconds} seconds")]
    InvalidDelay {
        /// The rejected duration.
        seconds: f64,
    },
}

/// Errors detected while validating a configuration.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// `initial_capacity` is larger than `max_capacity`.
    #[error("initial capacity {initial} exceeds max capacity {max}")]
    InitialExceedsMax {
        /// Configured initial capacity.
        initial: u32,
        /// Configured hard capacity.
        max: u32,
    },
    /// A capacity beyond what a handle index can address.
    #[error("capacity {value} exceeds addressable slot count {limit}")]
    CapacityTooLarge {
        /// The configured value.
        value: u32,
        /// The largest addressable slot count.
        limit: u32,
    },
    /// A hard capacity of zero slots.
    #[error("max capacity must be at least 1")]
    ZeroCapacity,
    /// Time scale is NaN, infinite or negative.
    #[error("time scale must be finite and non-negative, got {value}")]
    InvalidTimeScale {
        /// The invalid value.
        value: f64,
    },
}
