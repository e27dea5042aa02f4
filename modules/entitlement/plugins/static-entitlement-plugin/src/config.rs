//! Configuration for the static entitlement plugin.

use serde::Deserialize;

/// Wildcard entry matching any user.
pub const ANY_USER: &str = "*";

/// Plugin configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticEntitlementPluginConfig {
    /// Users allowed to perform any action other than `write`.
    pub readers: Vec<String>,

    /// Users allowed to `write`.
    pub writers: Vec<String>,
}
