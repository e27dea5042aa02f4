//! gRPC wire protocol of the decision oracle.
//!
//! Generated from `proto/entitlement.proto` at build time: service
//! `entitlement.Entitlement` with a single unary method `Entitled`.

#[allow(clippy::all, clippy::pedantic, clippy::nursery, clippy::restriction)]
mod generated {
    tonic::include_proto!("entitlement");
}

pub use generated::entitlement_client::EntitlementClient as EntitlementGrpcClient;
pub use generated::entitlement_server::{Entitlement, EntitlementServer};
pub use generated::{EntitlementRequest, EntitlementResponse};

impl From<&crate::models::EntitlementQuery> for EntitlementRequest {
    fn from(query: &crate::models::EntitlementQuery) -> Self {
        Self {
            action: query.action.clone(),
            label_value: query.label_value.clone(),
            user_id: query.user_id.clone(),
        }
    }
}

impl From<EntitlementRequest> for crate::models::EntitlementQuery {
    fn from(req: EntitlementRequest) -> Self {
        Self {
            action: req.action,
            user_id: req.user_id,
            label_value: req.label_value,
        }
    }
}
