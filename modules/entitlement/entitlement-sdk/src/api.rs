//! Public API trait for entitlement decisions.

use async_trait::async_trait;

use crate::error::EntitlementError;

/// Public API trait for the entitlement gate.
///
/// Consumers acting as PEPs ask whether `user_id` may perform `action` on the
/// resource described by the raw label-set string:
///
/// ```ignore
/// let allowed = client.entitled("read", "alice", r#"{job="api"}"#).await;
/// ```
#[async_trait]
pub trait EntitlementClient: Send + Sync {
    /// Decide, surfacing the failure when no decision could be obtained.
    ///
    /// # Errors
    ///
    /// - `Transport` / `Timeout` if the oracle stayed unreachable after the retry
    /// - `PatternCompilation` if the configured label key cannot be compiled
    async fn check(
        &self,
        action: &str,
        user_id: &str,
        label_string: &str,
    ) -> Result<bool, EntitlementError>;

    /// Decide, failing closed: when no decision can be obtained the answer
    /// is `false`.
    async fn entitled(&self, action: &str, user_id: &str, label_string: &str) -> bool;
}
