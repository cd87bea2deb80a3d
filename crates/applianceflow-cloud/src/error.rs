//! Appliance mutation error types

use std::time::Duration;
use thiserror::Error;

/// Appliance mutation errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Appliance not found: {0}")]
    NotFound(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Timeout waiting for {what} after {waited:?}")]
    Timeout { what: String, waited: Duration },

    /// Settings were persisted but never activated on the running appliance.
    #[error("Settings of {appliance_id} were saved but not applied: {reason}")]
    PartialApply {
        appliance_id: String,
        reason: String,
    },

    #[error("{operation} failed for appliance {appliance_id}: {source}")]
    Context {
        operation: &'static str,
        appliance_id: String,
        #[source]
        source: Box<CloudError>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Wrap this error with the operation and appliance it happened on
    pub fn context(self, operation: &'static str, appliance_id: impl Into<String>) -> Self {
        CloudError::Context {
            operation,
            appliance_id: appliance_id.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with all context layers stripped
    pub fn root(&self) -> &CloudError {
        match self {
            CloudError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), CloudError::NotFound(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), CloudError::Timeout { .. })
    }

    pub fn is_partial_apply(&self) -> bool {
        matches!(self.root(), CloudError::PartialApply { .. })
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

/// Attach operation context to the error side of a result
pub trait ResultExt<T> {
    fn context(self, operation: &'static str, appliance_id: &str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, operation: &'static str, appliance_id: &str) -> Result<T> {
        self.map_err(|e| e.context(operation, appliance_id))
    }
}
