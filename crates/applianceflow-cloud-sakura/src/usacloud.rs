//! usacloud CLI wrapper
//!
//! Wraps the usacloud `vpc-router` commands and exposes them as an
//! [`AggregateStore`]. Output parsing and failure classification are plain
//! functions so they can be tested without the CLI.

use crate::config::SakuraConfig;
use crate::error::{Result, SakuraError};
use crate::model::RouterSettings;
use applianceflow_cloud::{Aggregate, AggregateStore, Availability, PowerState};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::process::Command;

/// usacloud CLI wrapper
#[derive(Debug, Clone)]
pub struct Usacloud {
    zone: String,
    binary: String,
}

impl Usacloud {
    pub fn new(config: &SakuraConfig) -> Self {
        Self {
            zone: config.zone.clone(),
            binary: config.usacloud_path.clone(),
        }
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Check that usacloud is installed and authenticated
    pub async fn check_auth(&self) -> Result<UsacloudAuth> {
        let output = self
            .run_command(&["auth-status", "--output-type", "json"])
            .await
            .map_err(|e| match e {
                SakuraError::CommandFailed(msg) => SakuraError::AuthenticationFailed(msg),
                other => other,
            })?;

        let auth: UsacloudAuth = serde_json::from_str(&output)?;
        Ok(auth)
    }

    /// Run a usacloud command and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--zone").arg(&self.zone);
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        // parameters may carry pre-shared secrets; log the subcommand only
        let subcommand: Vec<&str> = args.iter().take(2).copied().collect();
        tracing::debug!(
            "Running: {} --zone {} {}",
            self.binary,
            self.zone,
            subcommand.join(" ")
        );

        let output = cmd.output().await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => SakuraError::UsacloudNotFound(self.binary.clone()),
            _ => SakuraError::IoError(e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SakuraError::CommandFailed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run a command against one router, classifying failures
    async fn run_router_command(&self, router_id: &str, args: &[&str]) -> Result<String> {
        match self.run_command(args).await {
            Err(SakuraError::CommandFailed(stderr)) => Err(classify_failure(router_id, &stderr)),
            other => other,
        }
    }

    pub async fn read_router(&self, router_id: &str) -> Result<RouterInfo> {
        let output = self
            .run_router_command(
                router_id,
                &["vpc-router", "read", router_id, "--output-type", "json"],
            )
            .await?;
        parse_router(&output)
    }

    /// Replace the router's whole settings document
    pub async fn update_router_settings(
        &self,
        router_id: &str,
        settings: &RouterSettings,
    ) -> Result<RouterInfo> {
        let parameters = serde_json::to_string(&UpdateParameters { settings })?;
        let output = self
            .run_router_command(
                router_id,
                &[
                    "vpc-router",
                    "update",
                    router_id,
                    "--parameters",
                    parameters.as_str(),
                    "--output-type",
                    "json",
                    "--yes",
                ],
            )
            .await?;
        parse_router(&output)
    }

    /// Push the saved settings to the running router
    pub async fn apply_changes(&self, router_id: &str) -> Result<()> {
        self.run_router_command(router_id, &["vpc-router", "apply-changes", router_id, "--yes"])
            .await?;
        Ok(())
    }

    pub async fn boot(&self, router_id: &str) -> Result<()> {
        self.run_router_command(router_id, &["vpc-router", "boot", router_id, "--yes"])
            .await?;
        Ok(())
    }

    /// Graceful shutdown, or a forced power-off when `force` is set
    pub async fn shutdown(&self, router_id: &str, force: bool) -> Result<()> {
        let mut args = vec!["vpc-router", "shutdown", router_id, "--yes"];
        if force {
            args.push("--force");
        }
        self.run_router_command(router_id, &args).await?;
        Ok(())
    }

    pub async fn delete_router(&self, router_id: &str) -> Result<()> {
        self.run_router_command(router_id, &["vpc-router", "delete", router_id, "--yes"])
            .await?;
        Ok(())
    }
}

/// Authentication status from usacloud
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsacloudAuth {
    #[serde(rename = "Account")]
    pub account: Option<AccountInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(rename = "ID")]
    pub id: serde_json::Value,
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Serialize)]
struct UpdateParameters<'a> {
    #[serde(rename = "Settings")]
    settings: &'a RouterSettings,
}

/// VPC router as returned by `usacloud vpc-router read`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterInfo {
    /// Numeric or string depending on the usacloud version
    #[serde(rename = "ID")]
    pub id: serde_json::Value,

    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Availability", default)]
    pub availability: Option<String>,

    #[serde(rename = "InstanceStatus", default)]
    pub instance_status: Option<String>,

    #[serde(rename = "Settings", default)]
    pub settings: Option<RouterSettings>,
}

impl RouterInfo {
    pub fn id_str(&self) -> String {
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn power_state(&self) -> Result<PowerState> {
        parse_power_state(self.instance_status.as_deref())
    }

    pub fn availability(&self) -> Availability {
        parse_availability(self.availability.as_deref())
    }

    pub fn into_aggregate(self) -> Aggregate<RouterSettings> {
        let availability = self.availability();
        Aggregate::new(self.id_str(), self.settings).with_availability(availability)
    }
}

/// Parse `vpc-router read` output; some usacloud versions wrap the router in an array
pub fn parse_router(output: &str) -> Result<RouterInfo> {
    let trimmed = output.trim();
    if trimmed.starts_with('[') {
        let mut routers: Vec<RouterInfo> = serde_json::from_str(trimmed)?;
        if routers.len() != 1 {
            return Err(SakuraError::UnexpectedOutput(format!(
                "expected one router, got {}",
                routers.len()
            )));
        }
        return Ok(routers.remove(0));
    }
    Ok(serde_json::from_str(trimmed)?)
}

pub fn parse_power_state(status: Option<&str>) -> Result<PowerState> {
    match status.map(str::to_ascii_lowercase).as_deref() {
        None | Some("") | Some("down") => Ok(PowerState::Down),
        Some("up") => Ok(PowerState::Up),
        Some("booting") => Ok(PowerState::Booting),
        Some("cleaning") | Some("shutting_down") => Ok(PowerState::ShuttingDown),
        Some(other) => Err(SakuraError::UnexpectedOutput(format!(
            "unknown instance status: {}",
            other
        ))),
    }
}

pub fn parse_availability(availability: Option<&str>) -> Availability {
    match availability.map(str::to_ascii_lowercase).as_deref() {
        Some("available") => Availability::Available,
        Some("migrating") | Some("uploading") | Some("transferring") => Availability::Migrating,
        Some("failed") => Availability::Failed,
        _ => Availability::Unknown,
    }
}

/// Map a failed command's stderr to an error kind
pub fn classify_failure(router_id: &str, stderr: &str) -> SakuraError {
    let lower = stderr.to_ascii_lowercase();
    if lower.contains("404") || lower.contains("not found") {
        SakuraError::RouterNotFound(router_id.to_string())
    } else if lower.contains("401") || lower.contains("unauthorized") {
        SakuraError::AuthenticationFailed(stderr.to_string())
    } else {
        SakuraError::CommandFailed(stderr.to_string())
    }
}

/// [`AggregateStore`] backed by the usacloud CLI
#[derive(Debug, Clone)]
pub struct UsacloudRouterStore {
    usacloud: Usacloud,
}

impl UsacloudRouterStore {
    pub fn new(config: &SakuraConfig) -> Self {
        Self {
            usacloud: Usacloud::new(config),
        }
    }

    pub fn usacloud(&self) -> &Usacloud {
        &self.usacloud
    }
}

#[async_trait]
impl AggregateStore for UsacloudRouterStore {
    type Settings = RouterSettings;

    async fn read(&self, appliance_id: &str) -> applianceflow_cloud::Result<Aggregate<RouterSettings>> {
        let router = self.usacloud.read_router(appliance_id).await?;
        Ok(router.into_aggregate())
    }

    async fn update_settings(
        &self,
        appliance_id: &str,
        settings: &RouterSettings,
    ) -> applianceflow_cloud::Result<Aggregate<RouterSettings>> {
        let router = self
            .usacloud
            .update_router_settings(appliance_id, settings)
            .await?;
        Ok(router.into_aggregate())
    }

    async fn apply_config(&self, appliance_id: &str) -> applianceflow_cloud::Result<bool> {
        self.usacloud.apply_changes(appliance_id).await?;
        Ok(true)
    }

    async fn boot(&self, appliance_id: &str) -> applianceflow_cloud::Result<bool> {
        self.usacloud.boot(appliance_id).await?;
        Ok(true)
    }

    async fn shutdown(&self, appliance_id: &str) -> applianceflow_cloud::Result<bool> {
        self.usacloud.shutdown(appliance_id, false).await?;
        Ok(true)
    }

    async fn stop(&self, appliance_id: &str) -> applianceflow_cloud::Result<bool> {
        self.usacloud.shutdown(appliance_id, true).await?;
        Ok(true)
    }

    async fn read_power_state(&self, appliance_id: &str) -> applianceflow_cloud::Result<PowerState> {
        let router = self.usacloud.read_router(appliance_id).await?;
        Ok(router.power_state()?)
    }

    async fn delete(&self, appliance_id: &str) -> applianceflow_cloud::Result<()> {
        self.usacloud.delete_router(appliance_id).await?;
        Ok(())
    }
}
