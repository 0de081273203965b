//! Benchmark workloads and utilities for the Cadence scheduler.
//!
//! Provides deterministic workloads shared by the criterion benches and
//! the `frame_loop` example:
//!
//! - [`mixed_workload`]: a scheduler pre-loaded with timers and frame
//!   counters of varied length, some looped
//! - [`churn`]: register/unregister cycles against a [`HandleRegistry`]
//! - [`FRAME_DT`]: a 60 Hz frame time

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use cadence_arena::HandleRegistry;
use cadence_core::{Handle, SchedulerError};
use cadence_engine::{Schedule, Scheduler};

/// Frame time of a 60 Hz host loop, in seconds.
pub const FRAME_DT: f64 = 1.0 / 60.0;

/// Deterministic stream of small integers (LCG step).
fn lcg(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state >> 33
}

/// Build the `i`-th item of the mixed workload.
///
/// Roughly half timers (0.1s to 2s), half frame counters (1 to 120
/// frames); every eighth item loops.
pub fn workload_item(i: usize, state: &mut u64) -> Schedule {
    let r = lcg(state);
    let schedule = if r % 2 == 0 {
        Schedule::seconds(0.1 + (r % 20) as f64 * 0.1)
    } else {
        Schedule::frames(1 + r % 120)
    };
    let schedule = if i % 8 == 0 { schedule.looped() } else { schedule };
    schedule.on_update(|_, elapsed| {
        std::hint::black_box(elapsed);
    })
}

/// Register `count` mixed items on `scheduler`.
pub fn mixed_workload(
    scheduler: &mut Scheduler,
    count: usize,
    seed: u64,
) -> Result<(), SchedulerError> {
    let mut state = seed;
    for i in 0..count {
        scheduler.register(workload_item(i, &mut state))?;
    }
    Ok(())
}

/// Run `cycles` rounds of "register `batch` values, unregister them all".
///
/// Returns the handles issued in the final round, all of them stale.
pub fn churn(registry: &mut HandleRegistry<u64>, batch: usize, cycles: usize) -> Vec<Handle> {
    let mut handles = Vec::with_capacity(batch);
    for cycle in 0..cycles {
        handles.clear();
        for i in 0..batch {
            if let Ok(h) = registry.register((cycle * batch + i) as u64) {
                handles.push(h);
            }
        }
        for &h in &handles {
            registry.unregister(h);
        }
    }
    handles
}
