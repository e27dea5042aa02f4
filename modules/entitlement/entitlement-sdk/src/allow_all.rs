//! Pass-through entitlement client.

use async_trait::async_trait;

use crate::api::EntitlementClient;
use crate::error::EntitlementError;

/// Entitlement client that allows everything.
///
/// Used by components built without the entitlement module. Every call is
/// logged at debug level so the skipped checks stay visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllEntitlements;

#[async_trait]
impl EntitlementClient for AllowAllEntitlements {
    async fn check(
        &self,
        action: &str,
        user_id: &str,
        label_string: &str,
    ) -> Result<bool, EntitlementError> {
        Ok(self.entitled(action, user_id, label_string).await)
    }

    async fn entitled(&self, action: &str, user_id: &str, label_string: &str) -> bool {
        tracing::debug!(action, user_id, label_string, "Entitled (allow-all)");
        true
    }
}
