//! Domain errors for the entitlement module.

use std::time::Duration;

use entitlement_sdk::EntitlementError;

/// Internal domain errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("oracle transport failed: {0}")]
    Transport(String),

    #[error("oracle did not answer within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("invalid label key '{label_key}': {reason}")]
    PatternCompilation { label_key: String, reason: String },

    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl DomainError {
    /// Whether rebuilding the channel may fix the failure.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }
}

impl From<tonic::Status> for DomainError {
    fn from(status: tonic::Status) -> Self {
        Self::Transport(format!("{}: {}", status.code(), status.message()))
    }
}

impl From<EntitlementError> for DomainError {
    fn from(e: EntitlementError) -> Self {
        match e {
            EntitlementError::Transport(msg) => Self::Transport(msg),
            EntitlementError::Timeout(after) => Self::Timeout(after),
            EntitlementError::PatternCompilation { label_key, reason } => {
                Self::PatternCompilation { label_key, reason }
            }
            EntitlementError::Configuration(msg) => Self::Configuration(msg),
        }
    }
}

impl From<DomainError> for EntitlementError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Transport(msg) => Self::Transport(msg),
            DomainError::Timeout(after) => Self::Timeout(after),
            DomainError::PatternCompilation { label_key, reason } => {
                Self::PatternCompilation { label_key, reason }
            }
            DomainError::Configuration(msg) => Self::Configuration(msg),
        }
    }
}
