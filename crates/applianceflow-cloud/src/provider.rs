//! Remote aggregate store trait definition

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Access to the single settings document owned by each appliance
///
/// Every appliance kind (VPC router, load balancer, database) implements
/// this trait once. The settings document can only be read and written as a
/// whole; writing it does not activate it, `apply_config` does.
#[async_trait]
pub trait AggregateStore: Send + Sync {
    /// The appliance's full settings document
    type Settings: Clone + Default + Send + Sync + 'static;

    /// Read the full aggregate. Fails with `NotFound` if the appliance does not exist.
    async fn read(&self, appliance_id: &str) -> Result<Aggregate<Self::Settings>>;

    /// Persist a full settings document. The running appliance is unaffected until `apply_config`.
    async fn update_settings(
        &self,
        appliance_id: &str,
        settings: &Self::Settings,
    ) -> Result<Aggregate<Self::Settings>>;

    /// Push the persisted settings to the running appliance
    async fn apply_config(&self, appliance_id: &str) -> Result<bool>;

    async fn boot(&self, appliance_id: &str) -> Result<bool>;

    /// Graceful shutdown
    async fn shutdown(&self, appliance_id: &str) -> Result<bool>;

    /// Forced power-off
    async fn stop(&self, appliance_id: &str) -> Result<bool>;

    async fn read_power_state(&self, appliance_id: &str) -> Result<PowerState>;

    /// Remove the appliance itself
    async fn delete(&self, appliance_id: &str) -> Result<()>;
}

/// Snapshot of one appliance's settings document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate<S> {
    pub appliance_id: String,

    /// Absent until the first sub-resource of any kind is created
    pub settings: Option<S>,

    pub availability: Availability,
}

impl<S> Aggregate<S> {
    pub fn new(appliance_id: impl Into<String>, settings: Option<S>) -> Self {
        Self {
            appliance_id: appliance_id.into(),
            settings,
            availability: Availability::Available,
        }
    }

    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }
}

/// Power state of an appliance, observed only by polling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    Down,
    Booting,
    Up,
    ShuttingDown,
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerState::Down => write!(f, "down"),
            PowerState::Booting => write!(f, "booting"),
            PowerState::Up => write!(f, "up"),
            PowerState::ShuttingDown => write!(f, "shutting-down"),
        }
    }
}

/// Provisioning state of an appliance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    /// Still being provisioned (disk copy, migration)
    Migrating,
    Failed,
    Unknown,
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Available => write!(f, "available"),
            Availability::Migrating => write!(f, "migrating"),
            Availability::Failed => write!(f, "failed"),
            Availability::Unknown => write!(f, "unknown"),
        }
    }
}
