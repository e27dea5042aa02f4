#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Caller identity for entitlement checks.
//!
//! - [`Identity`] - the `{org_id, user_id}` pair resolved per request
//! - [`http`] - axum middleware resolving the identity from headers or the client certificate
//! - [`grpc`] - tonic interceptors keeping the identity header consistent across hops
//! - [`IdentityError`] - missing, duplicate or conflicting identity

pub mod cert;
pub mod constants;
pub mod error;
pub mod grpc;
pub mod http;
pub mod identity;

pub use cert::PeerCertificates;
pub use error::IdentityError;
pub use grpc::{ClientIdentityInterceptor, ServerIdentityInterceptor};
pub use http::{TenancyMode, identity_middleware};
pub use identity::{Identity, IdentityBuilder};
