//! Infrastructure adapters for the entitlement module.

pub mod grpc_client;

pub use grpc_client::{GrpcConnector, GrpcOracleClient};
