//! Domain layer for the entitlement module.

pub mod cache;
pub mod error;
pub mod label;
pub mod local_client;
pub mod remote;
pub mod retry;
pub mod service;

pub use cache::{DECISION_TTL, Decision, DecisionCache};
pub use error::DomainError;
pub use label::LabelExtractor;
pub use local_client::EntitlementLocalClient;
pub use remote::{OracleConnector, OracleHandle, RemoteDecisionClient};
pub use retry::RetryPolicy;
pub use service::Service;
