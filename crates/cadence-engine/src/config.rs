//! Scheduler configuration and validation.

use cadence_arena::ArenaConfig;
use cadence_core::ConfigError;

/// Configuration for constructing a [`Scheduler`](crate::Scheduler).
#[derive(Clone, Debug, PartialEq)]
pub struct SchedulerConfig {
    /// Sizing of the task table. Default: unbounded, 64 slots reserved.
    pub tasks: ArenaConfig,
    /// Initial multiplier from real to scaled time. Default: 1.0.
    pub time_scale: f64,
}

impl SchedulerConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tasks.validate()?;
        validate_time_scale(self.time_scale)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tasks: ArenaConfig::default(),
            time_scale: 1.0,
        }
    }
}

pub(crate) fn validate_time_scale(value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidTimeScale { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(SchedulerConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_time_scale_allowed() {
        let config = SchedulerConfig {
            time_scale: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_time_scale_rejected() {
        for value in [-1.0, f64::NAN, f64::INFINITY] {
            let config = SchedulerConfig {
                time_scale: value,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidTimeScale { .. })
            ));
        }
    }

    #[test]
    fn task_table_errors_surface() {
        let config = SchedulerConfig {
            tasks: ArenaConfig {
                initial_capacity: 0,
                max_capacity: Some(0),
            },
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));
    }
}
