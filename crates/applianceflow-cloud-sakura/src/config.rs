//! Sakura Cloud connection settings

use crate::error::{Result, SakuraError};

pub const ENV_ZONE: &str = "SAKURACLOUD_ZONE";
pub const ENV_USACLOUD_PATH: &str = "USACLOUD_PATH";

const DEFAULT_USACLOUD: &str = "usacloud";

/// Where and how to reach Sakura Cloud
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SakuraConfig {
    /// Zone the routers live in (e.g. "is1a", "tk1a")
    pub zone: String,

    /// usacloud binary to invoke
    pub usacloud_path: String,
}

impl SakuraConfig {
    pub fn new(zone: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            usacloud_path: DEFAULT_USACLOUD.to_string(),
        }
    }

    pub fn with_usacloud_path(mut self, path: impl Into<String>) -> Self {
        self.usacloud_path = path.into();
        self
    }

    /// Read the zone (required) and usacloud path from the environment
    pub fn from_env() -> Result<Self> {
        let zone = std::env::var(ENV_ZONE)
            .ok()
            .filter(|z| !z.trim().is_empty())
            .ok_or_else(|| SakuraError::MissingConfig(format!("{} is not set", ENV_ZONE)))?;

        let mut config = Self::new(zone.trim());
        if let Ok(path) = std::env::var(ENV_USACLOUD_PATH) {
            if !path.trim().is_empty() {
                config.usacloud_path = path;
            }
        }
        Ok(config)
    }
}
