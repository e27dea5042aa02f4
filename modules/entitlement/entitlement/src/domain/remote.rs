//! Handle to the decision oracle.
//!
//! The current client lives in an `ArcSwapOption`: callers load it without
//! locking and keep their `Arc` for the duration of a call, so a concurrent
//! reconnect never tears a handle out from under an in-flight request.
//! Reconnects are serialized and publish the new handle atomically.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use entitlement_sdk::{EntitlementError, EntitlementOracleClient, EntitlementQuery};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::DomainError;

/// Builds oracle clients for an address.
///
/// Connecting is expected to be lazy: the returned client may only discover
/// that the oracle is unreachable on its first call.
pub trait OracleConnector: Send + Sync {
    /// # Errors
    ///
    /// `Configuration` if `address` cannot be turned into a channel.
    fn connect(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<Arc<dyn EntitlementOracleClient>, EntitlementError>;
}

/// One published connection to the oracle.
pub struct OracleHandle {
    address: String,
    generation: u64,
    client: Arc<dyn EntitlementOracleClient>,
}

impl std::fmt::Debug for OracleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleHandle")
            .field("address", &self.address)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl OracleHandle {
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Increases by one on every reconnect.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ask the oracle, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// `Timeout` if the oracle did not answer in time, or the client's own error.
    pub async fn entitled(
        &self,
        query: &EntitlementQuery,
        timeout: Duration,
    ) -> Result<bool, DomainError> {
        match tokio::time::timeout(timeout, self.client.entitled(query)).await {
            Ok(res) => res.map_err(DomainError::from),
            Err(_) => Err(DomainError::Timeout(timeout)),
        }
    }
}

/// Remote decision client: the current oracle handle plus the means to rebuild it.
pub struct RemoteDecisionClient {
    connector: Arc<dyn OracleConnector>,
    current: ArcSwapOption<OracleHandle>,
    reconnect_lock: Mutex<()>,
}

impl RemoteDecisionClient {
    #[must_use]
    pub fn new(connector: Arc<dyn OracleConnector>) -> Self {
        Self {
            connector,
            current: ArcSwapOption::empty(),
            reconnect_lock: Mutex::new(()),
        }
    }

    /// Currently published handle, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<OracleHandle>> {
        self.current.load_full()
    }

    /// Current handle, connecting to `address` first if there is none.
    ///
    /// A published handle is returned even if it points elsewhere: address
    /// changes go through [`RemoteDecisionClient::reconnect`].
    ///
    /// # Errors
    ///
    /// See [`RemoteDecisionClient::reconnect`].
    pub async fn handle(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<Arc<OracleHandle>, DomainError> {
        match self.current() {
            Some(handle) => Ok(handle),
            // Generations start at 1, so racing first callers connect once.
            None => self.reconnect(address, timeout, Some(0)).await,
        }
    }

    /// Build a new client for `address` and publish it.
    ///
    /// `failed_generation` is the generation the caller saw fail. If another
    /// caller already replaced that handle with one for the same address, the
    /// newer handle is returned without connecting again. `None` forces a
    /// rebuild.
    ///
    /// # Errors
    ///
    /// `Configuration` if the connector rejects the address. The previous
    /// handle stays published in that case.
    pub async fn reconnect(
        &self,
        address: &str,
        timeout: Duration,
        failed_generation: Option<u64>,
    ) -> Result<Arc<OracleHandle>, DomainError> {
        let _guard = self.reconnect_lock.lock().await;

        let previous = self.current.load_full();
        if let (Some(prev), Some(failed)) = (&previous, failed_generation) {
            if prev.generation != failed && prev.address == address {
                debug!(address, generation = prev.generation, "Channel already rebuilt");
                return Ok(Arc::clone(prev));
            }
        }

        let client = self.connector.connect(address, timeout)?;
        let generation = previous.as_ref().map_or(1, |prev| prev.generation + 1);
        let handle = Arc::new(OracleHandle {
            address: address.to_owned(),
            generation,
            client,
        });
        self.current.store(Some(Arc::clone(&handle)));

        info!(address, generation, "Connected to entitlement oracle");
        Ok(handle)
    }

    /// Drop the published handle.
    pub async fn disconnect(&self) {
        let _guard = self.reconnect_lock.lock().await;
        if self.current.swap(None).is_some() {
            info!("Disconnected from entitlement oracle");
        }
    }
}
