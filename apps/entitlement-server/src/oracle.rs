//! gRPC front end of a decision oracle.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use ent_identity::ServerIdentityInterceptor;
use ent_identity::grpc::RequestIdentityExt;
use entitlement_sdk::proto::{
    Entitlement, EntitlementRequest, EntitlementResponse, EntitlementServer,
};
use entitlement_sdk::{EntitlementError, EntitlementOracleClient, EntitlementQuery};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

/// Serves `Entitlement/Entitled` from any oracle implementation.
pub struct OracleGrpcService {
    oracle: Arc<dyn EntitlementOracleClient>,
}

impl OracleGrpcService {
    #[must_use]
    pub fn new(oracle: Arc<dyn EntitlementOracleClient>) -> Self {
        Self { oracle }
    }

    /// The service wrapped in the inbound identity interceptor.
    #[must_use]
    pub fn into_service(
        self,
    ) -> InterceptedService<EntitlementServer<Self>, ServerIdentityInterceptor> {
        InterceptedService::new(EntitlementServer::new(self), ServerIdentityInterceptor)
    }
}

#[async_trait]
impl Entitlement for OracleGrpcService {
    async fn entitled(
        &self,
        request: Request<EntitlementRequest>,
    ) -> Result<Response<EntitlementResponse>, Status> {
        let caller = request
            .identity()
            .map(|identity| identity.user_id().to_owned())
            .unwrap_or_default();
        let query = EntitlementQuery::from(request.into_inner());

        let entitled = self.oracle.entitled(&query).await.map_err(|e| {
            tracing::warn!(caller = %caller, error = %e, "Oracle failed to decide");
            match e {
                EntitlementError::Transport(_) | EntitlementError::Timeout(_) => {
                    Status::unavailable(e.to_string())
                }
                EntitlementError::PatternCompilation { .. } | EntitlementError::Configuration(_) => {
                    Status::internal(e.to_string())
                }
            }
        })?;

        tracing::debug!(
            caller = %caller,
            user_id = %query.user_id,
            action = %query.action,
            label_value = %query.label_value,
            entitled,
            "Answered entitlement request"
        );
        Ok(Response::new(EntitlementResponse { entitled }))
    }
}

/// Serve `oracle` on `listener` until `shutdown` completes.
///
/// # Errors
///
/// Returns the transport error that stopped the server.
pub async fn serve(
    listener: TcpListener,
    oracle: Arc<dyn EntitlementOracleClient>,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "Entitlement oracle listening");
    }

    Server::builder()
        .add_service(OracleGrpcService::new(oracle).into_service())
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await?;

    tracing::info!("Entitlement oracle stopped");
    Ok(())
}
