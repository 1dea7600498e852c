use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Request to the portal failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Login rejected: {0}")]
    AuthFailed(String),

    #[error("The portal denied access to {0}")]
    Forbidden(String),

    #[error("Could not parse grade information from the portal")]
    ExtractionExhausted,

    #[error("Browser extraction failed: {0}")]
    Browser(String),

    #[error("Attempt exceeded its wall-clock budget of {0:?}")]
    AttemptTimeout(Duration),

    #[error("Chat transport failed: {0}")]
    Transport(String),
}

impl PortalError {
    /// Whether this failure means the submitted credentials were refused,
    /// as opposed to the portal being unreachable or unparsable.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, PortalError::AuthFailed(_) | PortalError::Forbidden(_))
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
