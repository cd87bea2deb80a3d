//! Bounded poll-wait primitive
//!
//! Every "wait until the remote side reaches some state" loop goes through
//! [`wait_until`]: power transitions, availability after provisioning, and
//! appliance-specific readiness checks.

use crate::error::{CloudError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Floor for the delay between checks; a zero interval would spin on the remote API
pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Polling interval and total deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Delay between two checks
    pub interval: Duration,
    /// Maximum total time to wait
    pub timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(600),
        }
    }
}

impl WaitConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }
}

/// Poll `check` until it reports `true`.
///
/// A check error is returned immediately. When the deadline passes without
/// success, returns [`CloudError::Timeout`]. The loop always sleeps between
/// checks and never sleeps past the deadline, so total blocking is bounded
/// by `timeout` plus the duration of one check.
pub async fn wait_until<F, Fut>(config: WaitConfig, what: &str, mut check: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        if check().await? {
            tracing::debug!(what, attempts, "Condition reached");
            return Ok(());
        }

        let elapsed = start.elapsed();
        if elapsed >= config.timeout {
            tracing::debug!(what, attempts, "Gave up waiting");
            return Err(CloudError::Timeout {
                what: what.to_string(),
                waited: elapsed,
            });
        }

        let remaining = config.timeout - elapsed;
        tracing::trace!(what, attempt = attempts, "Not ready, retrying");
        sleep(config.interval.max(MIN_INTERVAL).min(remaining)).await;
    }
}
