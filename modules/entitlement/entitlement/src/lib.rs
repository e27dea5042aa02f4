//! Entitlement Module
//!
//! Answers "may this user perform this action on this labeled resource" by
//! asking a remote decision oracle, caching answers briefly and degrading to
//! a denial when the oracle stays unreachable.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod infra;

pub use config::EntitlementConfig;
pub use domain::{DomainError, EntitlementLocalClient, Service};
pub use infra::GrpcConnector;
