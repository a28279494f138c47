use std::time::Duration;

use thiserror::Error;

use crate::MediaId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WatchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited by upstream, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("Media {0} not found upstream")]
    NotFound(MediaId),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Notification display error: {0}")]
    Display(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl WatchError {
    /// Transient failures are the only ones worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, WatchError::Network(_))
    }
}

impl From<serde_json::Error> for WatchError {
    fn from(e: serde_json::Error) -> Self {
        WatchError::InvalidResponse(e.to_string())
    }
}

pub type WatchResult<T> = Result<T, WatchError>;
