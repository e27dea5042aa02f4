//! HTTP identity middleware and extractor.
//!
//! The middleware resolves the organization and client user of every inbound
//! request and inserts an [`Identity`] into the request extensions:
//!
//! ```ignore
//! let router = Router::new()
//!     .route("/loki/api/v1/push", post(push))
//!     .layer(axum::middleware::from_fn_with_state(
//!         TenancyMode::MultiTenant,
//!         identity_middleware,
//!     ));
//! ```

use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::cert::PeerCertificates;
use crate::constants::{DEFAULT_ORG_ID, DEFAULT_USER_ID, ORG_ID_HEADER};
use crate::error::IdentityError;
use crate::identity::Identity;

/// How the organization ID is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenancyMode {
    /// The organization header is required on every request.
    #[default]
    MultiTenant,
    /// A fixed default organization is injected.
    SingleTenant,
}

/// Identity middleware.
///
/// For each request:
/// 1. Resolves the organization (header in multi-tenant mode, fixed default otherwise)
/// 2. Resolves the client user from the verified client certificate CN, or the default identity
/// 3. Inserts the resolved `Identity` and calls the next handler
pub async fn identity_middleware(
    State(mode): State<TenancyMode>,
    mut req: Request,
    next: Next,
) -> Response {
    let org_id = match resolve_org_id(mode, req.headers()) {
        Ok(org_id) => org_id,
        Err(err) => {
            tracing::debug!(error = %err, "Rejecting request without organization");
            return err.into_response();
        }
    };

    let user_id = resolve_user_id(req.extensions().get::<PeerCertificates>());
    tracing::debug!(org_id = %org_id, user_id = %user_id, "Client identity injected");

    let identity = Identity::builder().org_id(org_id).user_id(user_id).build();
    req.extensions_mut().insert(identity);
    next.run(req).await
}

fn resolve_org_id(mode: TenancyMode, headers: &HeaderMap) -> Result<String, IdentityError> {
    match mode {
        TenancyMode::SingleTenant => Ok(DEFAULT_ORG_ID.to_owned()),
        TenancyMode::MultiTenant => headers
            .get(ORG_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .ok_or(IdentityError::MissingOrgId),
    }
}

/// Resolve the client user ID.
///
/// A verified client certificate always wins and its leaf CN becomes the user ID.
/// An explicit user header from a trusted CN is not honoured.
fn resolve_user_id(peer: Option<&PeerCertificates>) -> String {
    peer.and_then(PeerCertificates::leaf_common_name)
        .unwrap_or_else(|| DEFAULT_USER_ID.to_owned())
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = IdentityError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(IdentityError::NotResolved)
    }
}
