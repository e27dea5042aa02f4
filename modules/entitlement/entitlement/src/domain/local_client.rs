//! Local (in-process) client for the entitlement module.

use std::sync::Arc;

use async_trait::async_trait;
use entitlement_sdk::{EntitlementClient, EntitlementError};

use super::{DomainError, Service};

/// Local client wrapping the service.
pub struct EntitlementLocalClient {
    svc: Arc<Service>,
}

impl EntitlementLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> EntitlementError {
    tracing::error!(operation = op, error = ?e, "entitlement call failed");
    e.into()
}

#[async_trait]
impl EntitlementClient for EntitlementLocalClient {
    async fn check(
        &self,
        action: &str,
        user_id: &str,
        label_string: &str,
    ) -> Result<bool, EntitlementError> {
        self.svc
            .check(action, user_id, label_string)
            .await
            .map_err(|e| log_and_convert("check", e))
    }

    async fn entitled(&self, action: &str, user_id: &str, label_string: &str) -> bool {
        self.svc.entitled(action, user_id, label_string).await
    }
}
