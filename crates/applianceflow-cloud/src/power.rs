//! Power-cycle controller
//!
//! Boot/shutdown/stop state machine over [`PowerState`], observed only by
//! polling. Structural changes that need a powered-off appliance run inside
//! [`PowerCycleController::with_power_cycle`].

use crate::config::PowerConfig;
use crate::error::{CloudError, Result, ResultExt};
use crate::provider::{AggregateStore, Availability, PowerState};
use crate::wait::wait_until;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub struct PowerCycleController<S: AggregateStore> {
    store: Arc<S>,
    config: PowerConfig,
}

impl<S: AggregateStore> Clone for PowerCycleController<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: AggregateStore> PowerCycleController<S> {
    pub fn new(store: Arc<S>, config: PowerConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &PowerConfig {
        &self.config
    }

    /// Default per-window deadline
    pub fn timeout(&self) -> Duration {
        self.config.poll.timeout
    }

    pub async fn power_state(&self, appliance_id: &str) -> Result<PowerState> {
        self.store
            .read_power_state(appliance_id)
            .await
            .context("read power state", appliance_id)
    }

    /// Power the appliance off.
    ///
    /// A running appliance gets a graceful shutdown first. If it is not down
    /// within `timeout`, forced stops are issued, each followed by another
    /// `timeout` window, up to `max_stop_attempts` times.
    pub async fn ensure_down(&self, appliance_id: &str, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        match self.power_state(appliance_id).await? {
            PowerState::Down => {
                tracing::debug!(appliance_id, "Already down");
                return Ok(());
            }
            PowerState::ShuttingDown => {
                tracing::debug!(appliance_id, "Shutdown already in progress");
            }
            PowerState::Up | PowerState::Booting => {
                tracing::info!(appliance_id, "Shutting down appliance");
                accepted("shutdown", appliance_id, self.store.shutdown(appliance_id).await)?;
            }
        }

        match self.wait_for(appliance_id, PowerState::Down, timeout).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_timeout() => {
                tracing::warn!(appliance_id, "Graceful shutdown timed out, forcing stop");
                self.force_stop_since(appliance_id, timeout, start).await
            }
            Err(e) => Err(e),
        }
    }

    /// Issue forced stops until the appliance is down.
    ///
    /// A non-timeout error aborts at once and is returned as is. If every
    /// attempt times out, the returned timeout covers all attempts.
    /// Called from [`Self::ensure_down`], it also covers the graceful window.
    pub async fn force_stop(&self, appliance_id: &str, timeout: Duration) -> Result<()> {
        self.force_stop_since(appliance_id, timeout, Instant::now()).await
    }

    /// `start` marks when powering off began, so an escalated timeout
    /// reports the graceful window too
    async fn force_stop_since(
        &self,
        appliance_id: &str,
        timeout: Duration,
        start: Instant,
    ) -> Result<()> {
        let attempts = self.config.max_stop_attempts.max(1);

        for attempt in 1..=attempts {
            tracing::info!(appliance_id, attempt, "Forcing appliance stop");
            accepted("stop", appliance_id, self.store.stop(appliance_id).await)?;

            match self.wait_for(appliance_id, PowerState::Down, timeout).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_timeout() => {
                    tracing::warn!(appliance_id, attempt, "Appliance still running after stop");
                }
                Err(e) => return Err(e),
            }
        }

        Err(CloudError::Timeout {
            what: format!("{} to power off after {} forced stop(s)", appliance_id, attempts),
            waited: start.elapsed(),
        })
    }

    /// Boot the appliance and wait until it is up
    pub async fn boot(&self, appliance_id: &str, timeout: Duration) -> Result<()> {
        tracing::info!(appliance_id, "Booting appliance");
        accepted("boot", appliance_id, self.store.boot(appliance_id).await)?;
        self.wait_for(appliance_id, PowerState::Up, timeout).await
    }

    /// Wait until a freshly provisioned appliance becomes available
    pub async fn wait_available(&self, appliance_id: &str, timeout: Duration) -> Result<()> {
        let store = &self.store;
        let what = format!("{} to become available", appliance_id);

        wait_until(self.config.poll.with_timeout(timeout), &what, || async move {
            let aggregate = store.read(appliance_id).await?;
            match aggregate.availability {
                Availability::Available => Ok(true),
                Availability::Failed => Err(CloudError::ApiError(format!(
                    "appliance {} failed to provision",
                    appliance_id
                ))),
                Availability::Migrating | Availability::Unknown => Ok(false),
            }
        })
        .await
        .context("wait for availability", appliance_id)
    }

    /// Run `mutation`, powering the appliance off before and on after it when required.
    ///
    /// Power transitions only happen when `needs_restart` is set and the
    /// appliance was up beforehand. If the mutation fails the appliance is
    /// still booted again and the mutation's error is returned.
    pub async fn with_power_cycle<F, Fut, T>(
        &self,
        appliance_id: &str,
        needs_restart: bool,
        mutation: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !needs_restart {
            return mutation().await;
        }

        let was_running = self.power_state(appliance_id).await? == PowerState::Up;
        if was_running {
            self.ensure_down(appliance_id, self.timeout()).await?;
        }

        let result = mutation().await;

        if was_running {
            if let Err(boot_err) = self.boot(appliance_id, self.timeout()).await {
                if result.is_ok() {
                    return Err(boot_err);
                }
                tracing::warn!(appliance_id, error = %boot_err, "Reboot after failed mutation failed");
            }
        }

        result
    }

    async fn wait_for(&self, appliance_id: &str, target: PowerState, timeout: Duration) -> Result<()> {
        let store = &self.store;
        let what = format!("{} to be {}", appliance_id, target);

        wait_until(self.config.poll.with_timeout(timeout), &what, || async move {
            let state = store.read_power_state(appliance_id).await?;
            Ok(state == target)
        })
        .await
    }
}

fn accepted(operation: &'static str, appliance_id: &str, result: Result<bool>) -> Result<()> {
    match result {
        Ok(true) => Ok(()),
        Ok(false) => Err(CloudError::ApiError(format!("{} request was rejected", operation))
            .context(operation, appliance_id)),
        Err(e) => Err(e.context(operation, appliance_id)),
    }
}
