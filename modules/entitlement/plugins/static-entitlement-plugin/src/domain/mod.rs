//! Domain layer for the static entitlement plugin.

mod client;
pub mod service;

pub use service::Service;
