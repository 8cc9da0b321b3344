//! Client error taxonomy

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("GitLab connection is not configured: {0}")]
    NotConfigured(String),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("permission denied ({status}) for {url}")]
    Permission { status: u16, url: String },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Transport failures and non-2xx responses
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ClientError::Network(_)
                | ClientError::Status { .. }
                | ClientError::NotFound(_)
                | ClientError::Permission { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
