//! API trait for decision oracles.

use async_trait::async_trait;

use crate::error::EntitlementError;
use crate::models::EntitlementQuery;

/// API trait for decision oracle implementations.
///
/// The entitlement module consults the oracle on every cache miss. The remote
/// gRPC client and the in-process static oracle both implement it.
#[async_trait]
pub trait EntitlementOracleClient: Send + Sync {
    /// Ask the oracle for a decision.
    ///
    /// # Errors
    ///
    /// - `Transport` if the oracle could not be reached
    async fn entitled(&self, query: &EntitlementQuery) -> Result<bool, EntitlementError>;
}
