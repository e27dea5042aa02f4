//! `entserver` configuration loading.

use std::path::Path;

use anyhow::{Context, ensure};
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use static_entitlement_plugin::StaticEntitlementPluginConfig;

/// Prefix of environment overrides, e.g. `ENTSERVER_WRITERS='["alice"]'`.
pub const ENV_PREFIX: &str = "ENTSERVER_";

/// Load the reader/writer lists from `path`, then apply environment overrides.
///
/// Unknown keys are rejected.
///
/// # Errors
///
/// Returns an error if the file does not exist or does not parse.
pub fn load(path: &Path) -> anyhow::Result<StaticEntitlementPluginConfig> {
    ensure!(
        path.is_file(),
        "config file {} does not exist",
        path.display()
    );

    Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()
        .with_context(|| format!("invalid config file {}", path.display()))
}
