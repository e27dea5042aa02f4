#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Entitlement Plugin
//!
//! A decision oracle for development and testing. Decisions come from two
//! lists of user IDs loaded at startup; the label value is ignored.
//!
//! ## Configuration
//!
//! ```yaml
//! readers: ["*"]
//! writers: ["alice", "bob"]
//! ```

pub mod config;
pub mod domain;

pub use config::StaticEntitlementPluginConfig;
pub use domain::Service;
