//! Power-cycle and polling configuration

use crate::error::{CloudError, Result};
use crate::wait::WaitConfig;
use std::time::Duration;

pub const ENV_POLL_INTERVAL: &str = "APPLIANCEFLOW_POLL_INTERVAL_SECS";
pub const ENV_POWER_TIMEOUT: &str = "APPLIANCEFLOW_POWER_TIMEOUT_SECS";
pub const ENV_STOP_ATTEMPTS: &str = "APPLIANCEFLOW_STOP_ATTEMPTS";

/// Settings for the power-cycle controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerConfig {
    /// Interval and per-window deadline for power-state polling
    pub poll: WaitConfig,

    /// Forced stops issued after a graceful shutdown times out
    pub max_stop_attempts: u32,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            poll: WaitConfig::default(),
            max_stop_attempts: 3,
        }
    }
}

impl PowerConfig {
    /// Build the configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let interval = env_secs(ENV_POLL_INTERVAL)?.unwrap_or(defaults.poll.interval);
        let timeout = env_secs(ENV_POWER_TIMEOUT)?.unwrap_or(defaults.poll.timeout);
        let max_stop_attempts = match std::env::var(ENV_STOP_ATTEMPTS) {
            Ok(v) => v.trim().parse::<u32>().map_err(|_| {
                CloudError::InvalidConfig(format!("{}: not a number: {}", ENV_STOP_ATTEMPTS, v))
            })?,
            Err(_) => defaults.max_stop_attempts,
        };

        if interval.is_zero() {
            return Err(CloudError::InvalidConfig(format!(
                "{} must be at least 1",
                ENV_POLL_INTERVAL
            )));
        }

        if max_stop_attempts == 0 {
            return Err(CloudError::InvalidConfig(format!(
                "{} must be at least 1",
                ENV_STOP_ATTEMPTS
            )));
        }

        Ok(Self {
            poll: WaitConfig::new(interval, timeout),
            max_stop_attempts,
        })
    }
}

fn env_secs(name: &str) -> Result<Option<Duration>> {
    match std::env::var(name) {
        Ok(v) => v
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| CloudError::InvalidConfig(format!("{}: not a number: {}", name, v))),
        Err(_) => Ok(None),
    }
}
