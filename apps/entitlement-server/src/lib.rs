#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Sample entitlement oracle server (`entserver`) and client (`entclient`).

pub mod config;
pub mod logging;
pub mod oracle;
