#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Entitlement SDK
//!
//! This crate provides the public API for the `entitlement` module:
//!
//! - [`EntitlementClient`] - Public API trait for consumers (PEPs)
//! - [`EntitlementOracleClient`] - API trait for decision oracles
//! - [`EntitlementQuery`], [`Action`] - Decision models
//! - [`EntitlementError`] - Error types
//! - [`AllowAllEntitlements`] - Pass-through client for builds without entitlement checks
//! - [`proto`] - gRPC wire protocol of the remote oracle
//!
//! ## Usage
//!
//! ```ignore
//! use entitlement_sdk::EntitlementClient;
//!
//! let labels = r#"{agent="curl", job="logtest00000999"}"#;
//! if !client.entitled("write", identity.user_id(), labels).await {
//!     return Err(StatusCode::FORBIDDEN);
//! }
//! ```

pub mod allow_all;
pub mod api;
pub mod error;
pub mod models;
pub mod oracle_api;
pub mod proto;

// Re-export main types at crate root
pub use allow_all::AllowAllEntitlements;
pub use api::EntitlementClient;
pub use error::EntitlementError;
pub use models::{Action, EntitlementQuery};
pub use oracle_api::EntitlementOracleClient;
