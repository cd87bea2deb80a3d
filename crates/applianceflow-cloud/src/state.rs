//! Tracked state of sub-resources
//!
//! Controllers publish what they observed through [`ResourceDataSink`].
//! [`ResourceState`] is the sink the caller keeps; [`StateManager`] persists
//! a set of them in `.applianceflow/state.json`.

use crate::error::{CloudError, Result};
use crate::identity::CompositeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".applianceflow";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";

/// Receives the observed fields of a sub-resource after a successful cycle
///
/// There is no rollback: fields set before a failing `set_field` stay set.
pub trait ResourceDataSink {
    fn set_id(&mut self, id: &CompositeId);

    fn set_field(&mut self, name: &str, value: serde_json::Value) -> Result<()>;

    /// The sub-resource is no longer present remotely
    fn clear(&mut self);
}

/// All tracked sub-resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalState {
    /// State file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// Resources indexed by kind:composite_id
    pub resources: HashMap<String, ResourceState>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            resources: HashMap::new(),
        }
    }
}

impl GlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get resources of one sub-resource kind
    pub fn resources_of_kind(&self, kind: &str) -> Vec<(&String, &ResourceState)> {
        let prefix = format!("{}:", kind);
        self.resources
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .collect()
    }

    /// Track a resource under its key; resources without an ID are dropped
    pub fn track(&mut self, state: ResourceState) {
        match state.key() {
            Some(key) if state.status == ResourceStatus::Present => {
                self.resources.insert(key, state);
            }
            Some(key) => {
                self.resources.remove(&key);
            }
            None => return,
        }
        self.updated_at = Utc::now();
    }

    /// Remove a resource
    pub fn remove_resource(&mut self, key: &str) -> Option<ResourceState> {
        let result = self.resources.remove(key);
        if result.is_some() {
            self.updated_at = Utc::now();
        }
        result
    }

    pub fn get_resource(&self, key: &str) -> Option<&ResourceState> {
        self.resources.get(key)
    }
}

/// State of a single sub-resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    /// Composite ID, unset until created or found
    pub id: Option<CompositeId>,

    /// Sub-resource kind (e.g. "port_forwarding")
    pub kind: String,

    pub status: ResourceStatus,

    /// Observed fields
    pub attributes: HashMap<String, serde_json::Value>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ResourceState {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: kind.into(),
            status: ResourceStatus::Unknown,
            attributes: HashMap::new(),
            updated_at: Utc::now(),
        }
    }

    /// Key used in [`GlobalState`]
    pub fn key(&self) -> Option<String> {
        self.id.as_ref().map(|id| format!("{}:{}", self.kind, id))
    }

    pub fn is_present(&self) -> bool {
        self.status == ResourceStatus::Present
    }

    pub fn get_attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

impl ResourceDataSink for ResourceState {
    fn set_id(&mut self, id: &CompositeId) {
        self.id = Some(id.clone());
        self.status = ResourceStatus::Present;
        self.updated_at = Utc::now();
    }

    fn set_field(&mut self, name: &str, value: serde_json::Value) -> Result<()> {
        if name.is_empty() {
            return Err(CloudError::StateError("empty attribute name".to_string()));
        }
        self.attributes.insert(name.to_string(), value);
        self.updated_at = Utc::now();
        Ok(())
    }

    fn clear(&mut self) {
        self.status = ResourceStatus::Absent;
        self.attributes.clear();
        self.updated_at = Utc::now();
    }
}

/// Status of a tracked sub-resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Found in the appliance's settings
    Present,
    /// Missing from the appliance's settings
    Absent,
    /// Not observed yet
    Unknown,
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::Present => write!(f, "present"),
            ResourceStatus::Absent => write!(f, "absent"),
            ResourceStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// State manager for reading/writing state files
pub struct StateManager {
    /// Project root directory
    project_root: PathBuf,
}

impl StateManager {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    fn state_dir(&self) -> PathBuf {
        self.project_root.join(STATE_DIR)
    }

    fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the current state
    pub async fn load(&self) -> Result<GlobalState> {
        let path = self.state_path();
        if !path.exists() {
            tracing::debug!("State file not found, returning empty state");
            return Ok(GlobalState::new());
        }

        let content = fs::read_to_string(&path).await?;
        let state: GlobalState = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!("Loaded state with {} resources", state.resources.len());
        Ok(state)
    }

    /// Save the state, keeping the previous file as a backup
    pub async fn save(&self, state: &GlobalState) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        let backup = self.backup_path();

        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
            tracing::debug!("Created state backup");
        }

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&path, content).await?;

        tracing::debug!("Saved state with {} resources", state.resources.len());
        Ok(())
    }
}
