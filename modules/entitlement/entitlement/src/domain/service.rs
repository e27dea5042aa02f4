//! Domain service for the entitlement module.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use entitlement_sdk::EntitlementQuery;
use tracing::{debug, info};

use super::cache::{DECISION_TTL, Decision, DecisionCache, unix_now};
use super::error::DomainError;
use super::label::LabelExtractor;
use super::remote::{OracleConnector, RemoteDecisionClient};
use super::retry::RetryPolicy;
use crate::config::EntitlementConfig;

/// Entitlement service.
///
/// Constructed once and shared as `Arc<Service>`. The oracle is connected on
/// first use; reconfiguration goes through [`Service::reload`].
pub struct Service {
    config: ArcSwap<EntitlementConfig>,
    labels: LabelExtractor,
    cache: DecisionCache,
    remote: RemoteDecisionClient,
    retry: RetryPolicy,
}

impl Service {
    /// # Errors
    ///
    /// See [`EntitlementConfig::validate`].
    pub fn new(
        config: EntitlementConfig,
        connector: Arc<dyn OracleConnector>,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        info!(
            authz_enabled = config.authz_enabled,
            grpc_server = %config.grpc_server,
            label_key = %config.label_key,
            "Entitlement service configured"
        );

        Ok(Self {
            config: ArcSwap::from_pointee(config),
            labels: LabelExtractor::new(),
            cache: DecisionCache::new(),
            remote: RemoteDecisionClient::new(connector),
            retry: RetryPolicy::default(),
        })
    }

    /// Decide whether `user_id` may perform `action` on the resource labeled
    /// `label_string`.
    ///
    /// Allows without asking when checks are disabled. Serves fresh cached
    /// decisions, otherwise asks the oracle (rebuilding the channel and
    /// retrying once on transport failure) and caches the answer.
    ///
    /// # Errors
    ///
    /// - `Transport` / `Timeout` if the retry failed too; nothing is cached
    /// - `PatternCompilation` if the label key cannot be compiled
    /// - `Configuration` if the channel cannot be built
    #[tracing::instrument(skip_all, fields(action = %action, user_id = %user_id))]
    pub async fn check(
        &self,
        action: &str,
        user_id: &str,
        label_string: &str,
    ) -> Result<bool, DomainError> {
        let cfg = self.config.load_full();
        if !cfg.checks_enabled() {
            debug!(
                authz_enabled = cfg.authz_enabled,
                grpc_server = %cfg.grpc_server,
                "Skipping entitlement check"
            );
            return Ok(true);
        }

        let label_value = self.labels.extract(&cfg.label_key, label_string)?;

        match self.cache.get(action, user_id, label_string) {
            Some(decision) if decision.is_fresh(unix_now(), DECISION_TTL) => {
                debug!(
                    label_value = %label_value,
                    entitled = decision.entitled,
                    timestamp = decision.timestamp,
                    "Cache hit"
                );
                return Ok(decision.entitled);
            }
            Some(decision) => debug!(
                label_value = %label_value,
                timestamp = decision.timestamp,
                "Cache expired, asking oracle"
            ),
            None => debug!(label_value = %label_value, "Cache miss, asking oracle"),
        }

        let query = EntitlementQuery::new(action, user_id, label_value);
        let entitled = self.ask_oracle(&cfg, &query).await?;

        self.cache.put(
            action,
            user_id,
            label_string,
            Decision::new(entitled, unix_now()),
        );
        debug!(label_value = %query.label_value, entitled, "Cached decision");

        Ok(entitled)
    }

    /// Like [`Service::check`], but fails closed: any error is logged and
    /// reported as `false`.
    pub async fn entitled(&self, action: &str, user_id: &str, label_string: &str) -> bool {
        match self.check(action, user_id, label_string).await {
            Ok(entitled) => entitled,
            Err(e) => {
                tracing::error!(action, user_id, error = %e, "Entitlement check failed, denying");
                false
            }
        }
    }

    async fn ask_oracle(
        &self,
        cfg: &EntitlementConfig,
        query: &EntitlementQuery,
    ) -> Result<bool, DomainError> {
        let seen_generation = &AtomicU64::new(0);

        self.retry
            .run(
                "entitled",
                move || async move {
                    let handle = self
                        .remote
                        .handle(&cfg.grpc_server, cfg.request_timeout)
                        .await?;
                    seen_generation.store(handle.generation(), Ordering::Relaxed);
                    handle.entitled(query, cfg.request_timeout).await
                },
                move || async move {
                    // Reconnect to whatever is configured now; a reload may
                    // have happened since this call started.
                    let current = self.config.load_full();
                    self.remote
                        .reconnect(
                            &current.grpc_server,
                            current.request_timeout,
                            Some(seen_generation.load(Ordering::Relaxed)),
                        )
                        .await
                        .map(drop)
                },
            )
            .await
    }

    /// Replace the configuration and rebuild the oracle channel.
    ///
    /// Cached decisions are kept.
    ///
    /// # Errors
    ///
    /// The new configuration is rejected as a whole if it fails validation or
    /// no channel can be built for its address.
    #[tracing::instrument(skip_all, fields(grpc_server = %config.grpc_server))]
    pub async fn reload(&self, config: EntitlementConfig) -> Result<(), DomainError> {
        config.validate()?;

        if config.checks_enabled() {
            self.remote
                .reconnect(&config.grpc_server, config.request_timeout, None)
                .await?;
        } else {
            self.remote.disconnect().await;
        }

        info!(
            authz_enabled = config.authz_enabled,
            label_key = %config.label_key,
            "Entitlement configuration reloaded"
        );
        self.config.store(Arc::new(config));
        Ok(())
    }

    /// Drop every cached decision.
    pub fn clear_cache(&self) {
        self.cache.clear();
        debug!("Decision cache cleared");
    }

    #[must_use]
    pub fn config(&self) -> Arc<EntitlementConfig> {
        self.config.load_full()
    }

    #[must_use]
    pub fn cache(&self) -> &DecisionCache {
        &self.cache
    }

    /// Number of compiled label patterns.
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.labels.len()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use entitlement_sdk::{EntitlementError, EntitlementOracleClient};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    const LABELS: &str = r#"{agent="curl", filename="/var/tmp/dummy", host="host1.example.com", job="logtest00000999"}"#;

    /// Oracle answering from a script, then with `fallback`.
    struct ScriptedOracle {
        script: Mutex<VecDeque<Result<bool, EntitlementError>>>,
        fallback: bool,
        calls: AtomicU32,
        last_query: Mutex<Option<EntitlementQuery>>,
        hang: bool,
    }

    impl ScriptedOracle {
        fn build(
            script: Vec<Result<bool, EntitlementError>>,
            fallback: bool,
            hang: bool,
        ) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                fallback,
                calls: AtomicU32::new(0),
                last_query: Mutex::new(None),
                hang,
            })
        }

        fn answering(fallback: bool) -> Arc<Self> {
            Self::build(vec![], fallback, false)
        }

        fn scripted(script: Vec<Result<bool, EntitlementError>>, fallback: bool) -> Arc<Self> {
            Self::build(script, fallback, false)
        }

        fn hanging() -> Arc<Self> {
            Self::build(vec![], true, true)
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EntitlementOracleClient for ScriptedOracle {
        async fn entitled(&self, query: &EntitlementQuery) -> Result<bool, EntitlementError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().unwrap() = Some(query.clone());
            if self.hang {
                std::future::pending::<()>().await;
            }
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or(Ok(self.fallback))
        }
    }

    struct FakeConnector {
        oracle: Arc<ScriptedOracle>,
        connects: AtomicU32,
        addresses: Mutex<Vec<String>>,
    }

    impl FakeConnector {
        fn new(oracle: Arc<ScriptedOracle>) -> Arc<Self> {
            Arc::new(Self {
                oracle,
                connects: AtomicU32::new(0),
                addresses: Mutex::new(Vec::new()),
            })
        }

        fn connects(&self) -> u32 {
            self.connects.load(Ordering::SeqCst)
        }
    }

    impl OracleConnector for FakeConnector {
        fn connect(
            &self,
            address: &str,
            _timeout: Duration,
        ) -> Result<Arc<dyn EntitlementOracleClient>, EntitlementError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            self.addresses.lock().unwrap().push(address.to_owned());
            Ok(self.oracle.clone())
        }
    }

    fn enabled_config() -> EntitlementConfig {
        EntitlementConfig {
            grpc_server: "127.0.0.1:21001".to_owned(),
            label_key: "job".to_owned(),
            authz_enabled: true,
            request_timeout: Duration::from_secs(1),
        }
    }

    fn service(oracle: &Arc<ScriptedOracle>) -> (Service, Arc<FakeConnector>) {
        let connector = FakeConnector::new(oracle.clone());
        let svc = Service::new(enabled_config(), connector.clone()).unwrap();
        (svc, connector)
    }

    fn transport() -> EntitlementError {
        EntitlementError::Transport("unavailable: connection refused".to_owned())
    }

    #[tokio::test]
    async fn disabled_allows_without_oracle() {
        let oracle = ScriptedOracle::answering(false);
        let connector = FakeConnector::new(oracle.clone());
        let cfg = EntitlementConfig {
            authz_enabled: false,
            ..enabled_config()
        };
        let svc = Service::new(cfg, connector.clone()).unwrap();

        assert!(svc.entitled("write", "mallory", LABELS).await);
        assert_eq!(oracle.calls(), 0);
        assert_eq!(connector.connects(), 0);
        assert!(svc.cache().is_empty());
    }

    #[tokio::test]
    async fn missing_address_allows_without_oracle() {
        let oracle = ScriptedOracle::answering(false);
        let cfg = EntitlementConfig {
            grpc_server: String::new(),
            ..enabled_config()
        };
        let svc = Service::new(cfg, FakeConnector::new(oracle.clone())).unwrap();

        assert!(svc.entitled("read", "alice", LABELS).await);
        assert_eq!(oracle.calls(), 0);
        assert!(svc.cache().is_empty());
    }

    #[tokio::test]
    async fn miss_asks_oracle_with_extracted_value_and_caches() {
        let oracle = ScriptedOracle::answering(true);
        let (svc, _) = service(&oracle);

        assert!(svc.entitled("read", "alice", LABELS).await);

        assert_eq!(oracle.calls(), 1);
        assert_eq!(
            oracle.last_query.lock().unwrap().clone(),
            Some(EntitlementQuery::new("read", "alice", "logtest00000999"))
        );
        let cached = svc.cache().get("read", "alice", LABELS).unwrap();
        assert!(cached.entitled);
        assert!(cached.is_fresh(unix_now(), DECISION_TTL));
    }

    #[tokio::test]
    async fn fresh_entry_is_served_without_oracle() {
        let oracle = ScriptedOracle::answering(true);
        let (svc, connector) = service(&oracle);
        svc.cache()
            .put("read", "alice", LABELS, Decision::new(false, unix_now() - 30));

        assert!(!svc.entitled("read", "alice", LABELS).await);
        assert_eq!(oracle.calls(), 0);
        assert_eq!(connector.connects(), 0);
    }

    #[tokio::test]
    async fn repeated_checks_hit_the_cache() {
        let oracle = ScriptedOracle::answering(true);
        let (svc, _) = service(&oracle);

        for _ in 0..5 {
            assert!(svc.entitled("read", "alice", LABELS).await);
        }
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn stale_entry_is_refreshed() {
        let oracle = ScriptedOracle::answering(true);
        let (svc, _) = service(&oracle);
        let stale = unix_now() - 61;
        svc.cache()
            .put("read", "alice", LABELS, Decision::new(false, stale));

        assert!(svc.entitled("read", "alice", LABELS).await);

        assert_eq!(oracle.calls(), 1);
        let cached = svc.cache().get("read", "alice", LABELS).unwrap();
        assert!(cached.entitled);
        assert!(cached.timestamp > stale);
    }

    #[tokio::test]
    async fn cache_key_is_the_full_label_string() {
        let oracle = ScriptedOracle::answering(true);
        let (svc, _) = service(&oracle);

        // Same extracted value, different label sets.
        assert!(svc.entitled("read", "alice", r#"{job="api", host="a"}"#).await);
        assert!(svc.entitled("read", "alice", r#"{job="api", host="b"}"#).await);

        assert_eq!(oracle.calls(), 2);
        assert_eq!(svc.cache().len(), 2);
    }

    #[tokio::test]
    async fn transport_failure_reconnects_once_and_retries() {
        let oracle = ScriptedOracle::scripted(vec![Err(transport())], true);
        let (svc, connector) = service(&oracle);

        assert_eq!(svc.check("read", "alice", LABELS).await, Ok(true));

        assert_eq!(oracle.calls(), 2);
        assert_eq!(connector.connects(), 2);
        assert!(svc.cache().get("read", "alice", LABELS).unwrap().entitled);
    }

    #[tokio::test]
    async fn second_failure_denies_and_is_not_cached() {
        let oracle = ScriptedOracle::scripted(vec![Err(transport()), Err(transport())], true);
        let (svc, connector) = service(&oracle);

        let err = svc.check("read", "alice", LABELS).await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(oracle.calls(), 2);
        assert_eq!(connector.connects(), 2);
        assert!(svc.cache().is_empty());

        // Oracle recovered: the next call asks again instead of serving a denial.
        assert!(svc.entitled("read", "alice", LABELS).await);
        assert_eq!(oracle.calls(), 3);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn fails_closed() {
        let oracle = ScriptedOracle::scripted(vec![Err(transport()), Err(transport())], true);
        let (svc, _) = service(&oracle);

        assert!(!svc.entitled("read", "alice", LABELS).await);
        assert!(logs_contain("Entitlement check failed, denying"));
    }

    #[tokio::test]
    async fn hung_oracle_is_cut_off() {
        let oracle = ScriptedOracle::hanging();
        let connector = FakeConnector::new(oracle.clone());
        let cfg = EntitlementConfig {
            request_timeout: Duration::from_millis(20),
            ..enabled_config()
        };
        let svc = Service::new(cfg, connector.clone()).unwrap();

        let err = svc.check("read", "alice", LABELS).await.unwrap_err();

        assert_eq!(err, DomainError::Timeout(Duration::from_millis(20)));
        assert_eq!(oracle.calls(), 2);
        assert_eq!(connector.connects(), 2);
        assert!(svc.cache().is_empty());
    }

    #[tokio::test]
    async fn reload_reconnects_once_to_new_address() {
        let oracle = ScriptedOracle::answering(true);
        let (svc, connector) = service(&oracle);
        assert!(svc.entitled("read", "alice", LABELS).await);
        assert_eq!(connector.connects(), 1);

        let moved = EntitlementConfig {
            grpc_server: "10.0.0.7:21001".to_owned(),
            ..enabled_config()
        };
        svc.reload(moved).await.unwrap();

        assert_eq!(connector.connects(), 2);
        assert_eq!(
            connector.addresses.lock().unwrap().last().map(String::as_str),
            Some("10.0.0.7:21001")
        );
        assert_eq!(svc.config().grpc_server, "10.0.0.7:21001");

        svc.clear_cache();
        assert!(svc.entitled("read", "alice", LABELS).await);
        assert_eq!(connector.connects(), 2);
    }

    #[tokio::test]
    async fn reload_to_disabled_allows_everything() {
        let oracle = ScriptedOracle::answering(false);
        let (svc, _) = service(&oracle);
        assert!(!svc.entitled("read", "alice", LABELS).await);

        svc.reload(EntitlementConfig::default()).await.unwrap();

        assert!(svc.entitled("read", "alice", LABELS).await);
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn reload_rejects_invalid_config() {
        let oracle = ScriptedOracle::answering(true);
        let (svc, connector) = service(&oracle);

        let bad = EntitlementConfig {
            label_key: "not a key".to_owned(),
            ..enabled_config()
        };
        assert!(svc.reload(bad).await.is_err());
        assert_eq!(svc.config().label_key, "job");
        assert_eq!(connector.connects(), 0);
    }

    #[test]
    fn new_rejects_invalid_config() {
        let oracle = ScriptedOracle::answering(true);
        let cfg = EntitlementConfig {
            grpc_server: "no-port".to_owned(),
            ..enabled_config()
        };

        let res = Service::new(cfg, FakeConnector::new(oracle));
        assert!(matches!(res, Err(DomainError::Configuration(_))));
    }

    #[test]
    fn new_rejects_address_the_channel_cannot_use() {
        let cfg = EntitlementConfig {
            grpc_server: "bad host:21001".to_owned(),
            ..enabled_config()
        };

        let res = Service::new(cfg, Arc::new(crate::infra::GrpcConnector));
        assert!(matches!(res, Err(DomainError::Configuration(_))));
    }

    #[tokio::test]
    async fn clear_cache_forces_new_decisions() {
        let oracle = ScriptedOracle::answering(true);
        let (svc, _) = service(&oracle);
        assert!(svc.entitled("read", "alice", LABELS).await);
        assert!(svc.entitled("write", "alice", LABELS).await);

        svc.clear_cache();

        assert!(svc.cache().is_empty());
        assert!(svc.entitled("read", "alice", LABELS).await);
        assert_eq!(oracle.calls(), 3);
    }

    #[tokio::test]
    async fn one_pattern_for_the_configured_key() {
        let oracle = ScriptedOracle::answering(true);
        let (svc, _) = service(&oracle);
        assert_eq!(svc.pattern_count(), 0);

        for user in ["alice", "bob", "carol"] {
            assert!(svc.entitled("read", user, LABELS).await);
        }
        assert_eq!(svc.pattern_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_checks_agree() {
        let oracle = ScriptedOracle::answering(true);
        let (svc, connector) = service(&oracle);
        let svc = Arc::new(svc);

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move {
                    let user = format!("user-{}", i % 4);
                    for _ in 0..50 {
                        assert!(svc.entitled("read", &user, LABELS).await);
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(svc.cache().len(), 4);
        assert_eq!(svc.pattern_count(), 1);
        assert_eq!(connector.connects(), 1);
        // Racing misses may each ask once; hits never do.
        assert!(oracle.calls() >= 4 && oracle.calls() <= 32);
    }
}
