//! gRPC transport to the decision oracle.
//!
//! Channels are built lazily: `connect` never touches the network, and an
//! unreachable oracle shows up as a `Transport` error on the first call.
//! Every call carries the subject user as the propagated identity.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ent_identity::grpc::RequestIdentityExt;
use ent_identity::{ClientIdentityInterceptor, Identity};
use entitlement_sdk::proto::{EntitlementGrpcClient, EntitlementRequest};
use entitlement_sdk::{EntitlementError, EntitlementOracleClient, EntitlementQuery};
use tonic::service::interceptor::InterceptedService;
use tonic::transport::{Channel, Endpoint};

use crate::domain::OracleConnector;

type OracleChannel = InterceptedService<Channel, ClientIdentityInterceptor>;

/// Oracle client over a tonic channel.
#[derive(Debug, Clone)]
pub struct GrpcOracleClient {
    client: EntitlementGrpcClient<OracleChannel>,
}

impl GrpcOracleClient {
    #[must_use]
    pub fn new(channel: Channel) -> Self {
        Self {
            client: EntitlementGrpcClient::new(InterceptedService::new(
                channel,
                ClientIdentityInterceptor,
            )),
        }
    }
}

#[async_trait]
impl EntitlementOracleClient for GrpcOracleClient {
    async fn entitled(&self, query: &EntitlementQuery) -> Result<bool, EntitlementError> {
        let identity = Identity::builder().user_id(query.user_id.as_str()).build();
        let request = tonic::Request::new(EntitlementRequest::from(query)).with_identity(identity);

        let mut client = self.client.clone();
        let response = client.entitled(request).await?;
        Ok(response.into_inner().entitled)
    }
}

/// Connects to oracles over plain-text HTTP/2.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrpcConnector;

impl OracleConnector for GrpcConnector {
    fn connect(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<Arc<dyn EntitlementOracleClient>, EntitlementError> {
        let endpoint = Endpoint::from_shared(format!("http://{address}"))
            .map_err(|e| {
                EntitlementError::Configuration(format!("invalid oracle address '{address}': {e}"))
            })?
            .connect_timeout(timeout)
            .timeout(timeout);

        Ok(Arc::new(GrpcOracleClient::new(endpoint.connect_lazy())))
    }
}
