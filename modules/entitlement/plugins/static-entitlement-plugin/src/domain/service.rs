//! Service implementation for the static entitlement plugin.

use std::collections::HashSet;

use entitlement_sdk::{Action, EntitlementQuery};

use crate::config::{ANY_USER, StaticEntitlementPluginConfig};

/// Static entitlement oracle.
#[derive(Debug, Clone, Default)]
pub struct Service {
    readers: HashSet<String>,
    writers: HashSet<String>,
}

impl Service {
    #[must_use]
    pub fn new(config: &StaticEntitlementPluginConfig) -> Self {
        Self {
            readers: config.readers.iter().cloned().collect(),
            writers: config.writers.iter().cloned().collect(),
        }
    }

    /// Decide a query.
    ///
    /// The list is picked by action class; the user matches by exact ID or
    /// through the `*` entry.
    #[must_use]
    pub fn decide(&self, query: &EntitlementQuery) -> bool {
        let allowed = match Action::classify(&query.action) {
            Action::Write => &self.writers,
            Action::Read => &self.readers,
        };
        let entitled = allowed.contains(&query.user_id) || allowed.contains(ANY_USER);

        tracing::debug!(
            user_id = %query.user_id,
            action = %query.action,
            label_value = %query.label_value,
            entitled,
            "Static entitlement decision"
        );
        entitled
    }
}
