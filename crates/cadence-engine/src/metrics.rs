//! Per-tick scheduler metrics.
//!
//! [`TickMetrics`] captures counts and timing for a single
//! `advance_one_tick()` call.

use cadence_core::TickId;

/// Counts and wall-clock duration of one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickMetrics {
    /// The tick these metrics describe.
    pub tick: TickId,
    /// Pending items merged into the active list during draining.
    pub drained: usize,
    /// Items that received an update this tick.
    pub advanced: usize,
    /// Completion callbacks fired (looped items count once per cycle).
    pub completed: usize,
    /// Items terminated because their owner guard failed.
    pub expired: usize,
    /// Items removed and recycled by the sweep.
    pub swept: usize,
    /// Active items remaining after the sweep.
    pub active: usize,
    /// Items registered during this tick that are deferred to the next.
    pub deferred: usize,
    /// Wall-clock time for the entire tick, in microseconds.
    pub total_us: u64,
}
