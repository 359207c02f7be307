use std::time::Duration;

use log::warn;

use crate::error::ConfigError;

/// Largest step count the atomic step cell can encode.
pub const MAX_STEPS_LIMIT: usize = (1 << 31) - 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub max_steps: usize,
    pub step_duration: Duration,
    pub poll_interval: Duration,
    /// Have the monitor block until the first publish instead of reporting
    /// `0/<max>` while the worker warms up.
    pub await_first_publish: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: 1000,
            step_duration: Duration::from_millis(15),
            poll_interval: Duration::from_secs(1),
            await_first_publish: false,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_steps == 0 || self.max_steps > MAX_STEPS_LIMIT {
            return Err(ConfigError::MaxSteps {
                got: self.max_steps,
                limit: MAX_STEPS_LIMIT,
            });
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.poll_interval <= self.step_duration {
            warn!(
                "poll interval {:?} is not coarser than step duration {:?}; the monitor may report every step",
                self.poll_interval, self.step_duration
            );
        }
        Ok(())
    }

    /// Rough number of report lines a run will print.
    pub fn expected_polls(&self) -> usize {
        let total = self.step_duration.as_secs_f64() * self.max_steps as f64;
        (total / self.poll_interval.as_secs_f64()).ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_scenario() {
        let config = RunConfig::default();
        assert_eq!(config.max_steps, 1000);
        assert_eq!(config.step_duration, Duration::from_millis(15));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert!(config.validate().is_ok());
        assert_eq!(config.expected_polls(), 15);
    }

    #[test]
    fn rejects_zero_steps_and_zero_poll() {
        let config = RunConfig {
            max_steps: 0,
            ..RunConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::MaxSteps {
                got: 0,
                limit: MAX_STEPS_LIMIT
            })
        );

        let config = RunConfig {
            poll_interval: Duration::ZERO,
            ..RunConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPollInterval));
    }

    #[test]
    fn fine_polling_is_allowed() {
        let config = RunConfig {
            poll_interval: Duration::from_millis(1),
            ..RunConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
