//! Identity errors and their protocol-level mappings.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised while resolving or propagating the caller identity.
///
/// Every variant terminates the request: HTTP `401` on the edge, a gRPC
/// status on RPC hops. None of them are silently defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The organization header is absent in multi-tenant mode.
    #[error("no org id")]
    MissingOrgId,

    /// The canonical identity header is absent on an inbound RPC.
    #[error("no user id")]
    MissingUserId,

    /// More than one canonical identity header value is present.
    #[error("multiple user IDs present")]
    TooManyUserIds,

    /// Outgoing metadata already carries a different identity than the context.
    #[error("different user ID already in metadata: expected '{expected}', found '{found}'")]
    ConflictingUserId { expected: String, found: String },

    /// The identity value cannot be carried in a metadata header.
    #[error("invalid user ID '{0}'")]
    InvalidUserId(String),

    /// The identity extension is missing; the middleware was not installed.
    #[error("identity not found - identity middleware not configured")]
    NotResolved,
}

impl From<IdentityError> for tonic::Status {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::MissingOrgId
            | IdentityError::MissingUserId
            | IdentityError::TooManyUserIds => tonic::Status::unauthenticated(err.to_string()),
            IdentityError::ConflictingUserId { .. } => {
                tonic::Status::permission_denied(err.to_string())
            }
            IdentityError::InvalidUserId(_) => tonic::Status::invalid_argument(err.to_string()),
            IdentityError::NotResolved => tonic::Status::internal(err.to_string()),
        }
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::NotResolved => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        };
        (status, self.to_string()).into_response()
    }
}
