//! Configuration for the entitlement module.

use std::time::Duration;

use serde::{Deserialize, Deserializer};
use tonic::codegen::http::Uri;
use tonic::codegen::http::uri::InvalidUri;

use crate::domain::label::validate_label_key;
use crate::domain::DomainError;

/// Default bound on a single oracle call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntitlementConfig {
    /// Oracle address as `host:port`. Empty disables the check.
    pub grpc_server: String,

    /// Label whose value is sent to the oracle, e.g. `job`.
    pub label_key: String,

    /// Master switch. When `false` every request is allowed.
    pub authz_enabled: bool,

    /// Bound on a single oracle call, e.g. `"5s"` or `"250ms"`.
    #[serde(deserialize_with = "deserialize_duration")]
    pub request_timeout: Duration,
}

impl Default for EntitlementConfig {
    fn default() -> Self {
        Self {
            grpc_server: String::new(),
            label_key: "job".to_owned(),
            authz_enabled: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl EntitlementConfig {
    /// Whether requests must be checked against the oracle.
    #[must_use]
    pub fn checks_enabled(&self) -> bool {
        self.authz_enabled && !self.grpc_server.is_empty()
    }

    /// Reject configurations that can never produce a decision.
    ///
    /// Only enforced while checks are enabled; a disabled gate accepts anything.
    ///
    /// # Errors
    ///
    /// - `PatternCompilation` if `label_key` is not a label name
    /// - `Configuration` if `grpc_server` is not `host:port` or the timeout is zero
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.checks_enabled() {
            return Ok(());
        }

        validate_label_key(&self.label_key)?;

        validate_address(&self.grpc_server)?;

        if self.request_timeout.is_zero() {
            return Err(DomainError::Configuration(
                "request_timeout must be greater than zero".to_owned(),
            ));
        }

        Ok(())
    }
}

/// `address` must be exactly the `host:port` authority of `http://{address}`,
/// the URI the oracle channel is built from.
fn validate_address(address: &str) -> Result<(), DomainError> {
    let invalid = |reason: &str| {
        DomainError::Configuration(format!(
            "grpc_server must be host:port, got '{address}': {reason}"
        ))
    };

    let uri: Uri = format!("http://{address}")
        .parse()
        .map_err(|e: InvalidUri| invalid(&e.to_string()))?;
    let authority = uri.authority().ok_or_else(|| invalid("no authority"))?;

    if authority.as_str() != address {
        return Err(invalid("unexpected path or user info"));
    }
    if authority.host().is_empty() {
        return Err(invalid("empty host"));
    }
    if authority.port_u16().is_none() {
        return Err(invalid("missing or invalid port"));
    }
    Ok(())
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}
