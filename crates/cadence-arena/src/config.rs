//! Arena configuration parameters.

use cadence_core::{ConfigError, MAX_INDEX};

/// Configuration for a [`GenerationalArena`](crate::GenerationalArena).
///
/// Controls the initial slot reservation and the optional hard capacity.
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Number of slots to reserve up front. Default: 64.
    pub initial_capacity: u32,

    /// Hard upper bound on the slot count. `None` means the arena may grow
    /// until it runs out of addressable handle indices
    /// ([`ArenaConfig::ADDRESSABLE_SLOTS`]).
    pub max_capacity: Option<u32>,
}

impl ArenaConfig {
    /// Number of distinct slot indices a [`Handle`](cadence_core::Handle)
    /// can address (2^24).
    pub const ADDRESSABLE_SLOTS: u32 = MAX_INDEX + 1;

    /// Default number of slots reserved at construction.
    pub const DEFAULT_INITIAL_CAPACITY: u32 = 64;

    /// Create a config with a hard capacity.
    pub fn bounded(max_capacity: u32) -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY.min(max_capacity),
            max_capacity: Some(max_capacity),
        }
    }

    /// The slot count at which `add` starts failing.
    pub fn effective_limit(&self) -> u32 {
        self.max_capacity
            .unwrap_or(Self::ADDRESSABLE_SLOTS)
            .min(Self::ADDRESSABLE_SLOTS)
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(max) = self.max_capacity {
            if max == 0 {
                return Err(ConfigError::ZeroCapacity);
            }
            if max > Self::ADDRESSABLE_SLOTS {
                return Err(ConfigError::CapacityTooLarge {
                    value: max,
                    limit: Self::ADDRESSABLE_SLOTS,
                });
            }
            if self.initial_capacity > max {
                return Err(ConfigError::InitialExceedsMax {
                    initial: self.initial_capacity,
                    max,
                });
            }
        }
        if self.initial_capacity > Self::ADDRESSABLE_SLOTS {
            return Err(ConfigError::CapacityTooLarge {
                value: self.initial_capacity,
                limit: Self::ADDRESSABLE_SLOTS,
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            max_capacity: None,
        }
    }
}
