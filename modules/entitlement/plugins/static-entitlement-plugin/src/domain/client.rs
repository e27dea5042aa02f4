//! Oracle client implementation for the static entitlement plugin.

use async_trait::async_trait;
use entitlement_sdk::{EntitlementError, EntitlementOracleClient, EntitlementQuery};

use super::service::Service;

#[async_trait]
impl EntitlementOracleClient for Service {
    async fn entitled(&self, query: &EntitlementQuery) -> Result<bool, EntitlementError> {
        Ok(self.decide(query))
    }
}
