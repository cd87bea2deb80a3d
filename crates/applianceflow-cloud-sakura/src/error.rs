//! Sakura Cloud provider error types

use applianceflow_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SakuraError {
    #[error("usacloud not found at {0}. Please install: brew install usacloud")]
    UsacloudNotFound(String),

    #[error("usacloud authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("usacloud command failed: {0}")]
    CommandFailed(String),

    #[error("VPC router not found: {0}")]
    RouterNotFound(String),

    #[error("Unexpected usacloud output: {0}")]
    UnexpectedOutput(String),

    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SakuraError>;

impl From<SakuraError> for CloudError {
    fn from(err: SakuraError) -> Self {
        match err {
            SakuraError::RouterNotFound(id) => CloudError::NotFound(id),
            SakuraError::MissingConfig(msg) => CloudError::InvalidConfig(msg),
            SakuraError::JsonError(e) => CloudError::Json(e),
            SakuraError::IoError(e) => CloudError::Io(e),
            other => CloudError::ApiError(other.to_string()),
        }
    }
}
