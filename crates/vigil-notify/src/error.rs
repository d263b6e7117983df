//! Notification error types.

use thiserror::Error;

pub type NotifyResult<T> = Result<T, NotifyError>;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Gateway request failed: {0}")]
    Gateway(#[from] reqwest::Error),

    #[error("Gateway rejected request: {0}")]
    Rejected(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NotifyError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
