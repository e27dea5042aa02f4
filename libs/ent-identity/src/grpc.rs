//! gRPC identity propagation.
//!
//! tonic interceptors run on the request head, so the same interceptor covers
//! unary and streaming calls:
//!
//! ```ignore
//! // outbound
//! let channel = Endpoint::from_shared(addr)?.connect_lazy();
//! let client = EntitlementGrpcClient::new(InterceptedService::new(channel, ClientIdentityInterceptor));
//!
//! // inbound
//! Server::builder()
//!     .add_service(InterceptedService::new(EntitlementServer::new(svc), ServerIdentityInterceptor))
//! ```

use tonic::metadata::MetadataValue;
use tonic::service::Interceptor;
use tonic::{Request, Status};

use crate::constants::{DEFAULT_ORG_ID, DEFAULT_USER_ID, USER_ID_METADATA_KEY};
use crate::error::IdentityError;
use crate::identity::Identity;

/// gRPC metadata key for the organization ID.
const ORG_ID_METADATA_KEY: &str = "x-scope-orgid";

/// Access to the [`Identity`] carried in a tonic request's extensions.
pub trait RequestIdentityExt {
    /// Identity attached to this request, if any.
    fn identity(&self) -> Option<&Identity>;

    /// Attach the identity that outbound interceptors will propagate.
    #[must_use]
    fn with_identity(self, identity: Identity) -> Self;
}

impl<T> RequestIdentityExt for Request<T> {
    fn identity(&self) -> Option<&Identity> {
        self.extensions().get::<Identity>()
    }

    fn with_identity(mut self, identity: Identity) -> Self {
        self.extensions_mut().insert(identity);
        self
    }
}

/// Outbound interceptor: propagates the context identity as the canonical header.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIdentityInterceptor;

impl Interceptor for ClientIdentityInterceptor {
    fn call(&mut self, request: Request<()>) -> Result<Request<()>, Status> {
        inject_user_id(request).map_err(|err| {
            tracing::warn!(error = %err, "Refusing to send request with inconsistent identity");
            Status::from(err)
        })
    }
}

/// Inbound interceptor: moves the canonical header into the request's `Identity`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerIdentityInterceptor;

impl Interceptor for ServerIdentityInterceptor {
    fn call(&mut self, request: Request<()>) -> Result<Request<()>, Status> {
        extract_user_id(request).map_err(|err| {
            tracing::debug!(error = %err, "Rejecting request without a single identity");
            Status::from(err)
        })
    }
}

/// Ensure the outgoing metadata carries exactly the context identity.
///
/// The context identity defaults to the fallback user when the request has none.
/// An identity header that is already present must hold exactly one value equal
/// to the context identity.
///
/// # Errors
///
/// - `TooManyUserIds` if the header already holds more than one value
/// - `ConflictingUserId` if the header holds a different identity
/// - `InvalidUserId` if the identity cannot be encoded as a header value
pub fn inject_user_id<T>(mut request: Request<T>) -> Result<Request<T>, IdentityError> {
    let user_id = request
        .identity()
        .map_or(DEFAULT_USER_ID, Identity::user_id)
        .to_owned();

    let present: Vec<String> = request
        .metadata()
        .get_all(USER_ID_METADATA_KEY)
        .iter()
        .map(|v| v.to_str().unwrap_or_default().to_owned())
        .collect();

    match present.as_slice() {
        [] => {
            let value = MetadataValue::try_from(user_id.as_str())
                .map_err(|_| IdentityError::InvalidUserId(user_id.clone()))?;
            request.metadata_mut().insert(USER_ID_METADATA_KEY, value);
            Ok(request)
        }
        [found] if *found == user_id => Ok(request),
        [found] => Err(IdentityError::ConflictingUserId {
            expected: user_id,
            found: found.clone(),
        }),
        _ => Err(IdentityError::TooManyUserIds),
    }
}

/// Read the canonical identity header of an inbound request into its extensions.
///
/// # Errors
///
/// - `MissingUserId` if the header is absent
/// - `TooManyUserIds` if the header holds more than one value
/// - `InvalidUserId` if the value is not printable ASCII
pub fn extract_user_id<T>(mut request: Request<T>) -> Result<Request<T>, IdentityError> {
    let user_id = {
        let mut values = request.metadata().get_all(USER_ID_METADATA_KEY).iter();
        let first = values.next().ok_or(IdentityError::MissingUserId)?;
        if values.next().is_some() {
            return Err(IdentityError::TooManyUserIds);
        }
        first
            .to_str()
            .map_err(|_| {
                IdentityError::InvalidUserId(String::from_utf8_lossy(first.as_bytes()).into_owned())
            })?
            .to_owned()
    };

    let org_id = request
        .metadata()
        .get(ORG_ID_METADATA_KEY)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_ORG_ID)
        .to_owned();

    let identity = Identity::builder().org_id(org_id).user_id(user_id).build();
    Ok(request.with_identity(identity))
}
