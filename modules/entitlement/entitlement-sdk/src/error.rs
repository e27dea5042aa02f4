//! Error types for the entitlement module.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when using the entitlement API.
///
/// These represent infrastructure/configuration failures only.
/// Denial is expressed as `entitled == false`, not as an error variant.
#[derive(Debug, Clone, Error)]
pub enum EntitlementError {
    /// The oracle could not be reached or failed the call.
    #[error("transport error: {0}")]
    Transport(String),

    /// The oracle did not answer in time.
    #[error("oracle did not answer within {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The configured label key cannot be turned into an extraction pattern.
    #[error("invalid label key '{label_key}': {reason}")]
    PatternCompilation { label_key: String, reason: String },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl EntitlementError {
    /// Whether rebuilding the channel and calling again may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }
}

impl From<tonic::Status> for EntitlementError {
    fn from(status: tonic::Status) -> Self {
        Self::Transport(format!("{}: {}", status.code(), status.message()))
    }
}
