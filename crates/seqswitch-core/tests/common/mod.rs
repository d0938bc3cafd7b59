//! Scripted mock clients and dialers for provider tests.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use seqswitch_core::{
    ActiveEndpointProvider, ActiveProviderConfig, ActiveRollupProvider, CancellationToken,
    Dialer, EthClient, ProviderError, RollupClient, TransportError,
};

pub const ALWAYS_CHECK: Duration = Duration::ZERO;
pub const NETWORK_TIMEOUT: Duration = Duration::from_secs(60);

enum Probe {
    Active(bool),
    Error(String),
    Hang,
}

/// Rollup client answering `sequencer_active` from a queue of expectations.
///
/// A probe with no queued expectation panics, failing the test.
pub struct MockRollupClient {
    url: String,
    expected: Mutex<VecDeque<Probe>>,
    probes: AtomicUsize,
    closes: AtomicUsize,
}

impl MockRollupClient {
    pub fn new(url: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            url: url.into(),
            expected: Mutex::new(VecDeque::new()),
            probes: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        })
    }

    pub fn expect_sequencer_active(&self, active: bool) {
        self.expected.lock().unwrap().push_back(Probe::Active(active));
    }

    pub fn expect_sequencer_error(&self, message: &str) {
        self.expected
            .lock()
            .unwrap()
            .push_back(Probe::Error(message.to_string()));
    }

    /// The next probe never answers.
    pub fn expect_hang(&self) {
        self.expected.lock().unwrap().push_back(Probe::Hang);
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn pending(&self) -> usize {
        self.expected.lock().unwrap().len()
    }
}

#[async_trait]
impl RollupClient for MockRollupClient {
    async fn sequencer_active(&self) -> Result<bool, TransportError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let next = self.expected.lock().unwrap().pop_front();
        match next {
            Some(Probe::Active(active)) => Ok(active),
            Some(Probe::Error(message)) => Err(TransportError::Other(message)),
            Some(Probe::Hang) => std::future::pending().await,
            None => panic!("unexpected sequencer_active call on {}", self.url),
        }
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MockEthClient {
    url: String,
    closes: AtomicUsize,
}

impl MockEthClient {
    pub fn new(url: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            url: url.into(),
            closes: AtomicUsize::new(0),
        })
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EthClient for MockEthClient {
    async fn chain_id(&self) -> Result<u64, TransportError> {
        Ok(10)
    }

    async fn block_number(&self) -> Result<u64, TransportError> {
        Ok(1)
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Hands out pre-built clients by URL and records every dial.
pub struct MockDialer<C: ?Sized> {
    clients: Vec<(String, Arc<C>)>,
    log: Arc<Mutex<Vec<String>>>,
    unreachable: Arc<Mutex<HashSet<String>>>,
}

#[async_trait]
impl<C: ?Sized + Send + Sync + 'static> Dialer<C> for MockDialer<C> {
    async fn dial(&self, url: &str, _timeout: Duration) -> Result<Arc<C>, TransportError> {
        self.log.lock().unwrap().push(url.to_string());
        if self.unreachable.lock().unwrap().contains(url) {
            return Err(TransportError::Http(format!("connection refused: {url}")));
        }
        self.clients
            .iter()
            .find(|(known, _)| known == url)
            .map(|(_, client)| client.clone())
            .ok_or_else(|| TransportError::Other(format!("unknown test url: {url}")))
    }
}

/// A replicated sequencer set of mock rollup + eth clients.
pub struct Harness {
    pub rollup: Vec<Arc<MockRollupClient>>,
    pub eth: Vec<Arc<MockEthClient>>,
    rollup_log: Arc<Mutex<Vec<String>>>,
    eth_log: Arc<Mutex<Vec<String>>>,
    unreachable: Arc<Mutex<HashSet<String>>>,
}

impl Harness {
    pub fn new(sequencers: usize) -> Self {
        Self {
            rollup: (0..sequencers)
                .map(|i| MockRollupClient::new(format!("rollup{i}")))
                .collect(),
            eth: (0..sequencers)
                .map(|i| MockEthClient::new(format!("eth{i}")))
                .collect(),
            rollup_log: Arc::default(),
            eth_log: Arc::default(),
            unreachable: Arc::default(),
        }
    }

    pub fn rollup_urls(&self) -> Vec<String> {
        (0..self.rollup.len()).map(|i| format!("rollup{i}")).collect()
    }

    pub fn eth_urls(&self) -> Vec<String> {
        (0..self.eth.len()).map(|i| format!("eth{i}")).collect()
    }

    pub fn set_unreachable(&self, url: &str, unreachable: bool) {
        let mut set = self.unreachable.lock().unwrap();
        if unreachable {
            set.insert(url.to_string());
        } else {
            set.remove(url);
        }
    }

    pub fn rollup_dials(&self) -> Vec<String> {
        self.rollup_log.lock().unwrap().clone()
    }

    pub fn eth_dials(&self) -> Vec<String> {
        self.eth_log.lock().unwrap().clone()
    }

    pub fn rollup_dialer(&self) -> MockDialer<dyn RollupClient> {
        MockDialer {
            clients: self
                .rollup_urls()
                .into_iter()
                .zip(&self.rollup)
                .map(|(url, client)| (url, client.clone() as Arc<dyn RollupClient>))
                .collect(),
            log: self.rollup_log.clone(),
            unreachable: self.unreachable.clone(),
        }
    }

    pub fn eth_dialer(&self) -> MockDialer<dyn EthClient> {
        MockDialer {
            clients: self
                .eth_urls()
                .into_iter()
                .zip(&self.eth)
                .map(|(url, client)| (url, client.clone() as Arc<dyn EthClient>))
                .collect(),
            log: self.eth_log.clone(),
            unreachable: self.unreachable.clone(),
        }
    }

    pub fn config(check_interval: Duration) -> ActiveProviderConfig {
        ActiveProviderConfig::new(check_interval, NETWORK_TIMEOUT)
    }

    pub async fn rollup_provider(
        &self,
        check_interval: Duration,
    ) -> Result<ActiveRollupProvider, ProviderError> {
        ActiveRollupProvider::new(
            self.rollup_urls(),
            Self::config(check_interval),
            self.rollup_dialer(),
            &CancellationToken::new(),
        )
        .await
    }

    pub async fn endpoint_provider(
        &self,
        check_interval: Duration,
    ) -> Result<ActiveEndpointProvider, ProviderError> {
        ActiveEndpointProvider::new(
            self.eth_urls(),
            self.rollup_urls(),
            Self::config(check_interval),
            self.eth_dialer(),
            self.rollup_dialer(),
            &CancellationToken::new(),
        )
        .await
    }
}

/// Whether a provider-held handle is the given mock instance.
pub fn same<T: ?Sized, U>(handle: &Arc<T>, mock: &Arc<U>) -> bool {
    std::ptr::eq(Arc::as_ptr(handle).cast::<u8>(), Arc::as_ptr(mock).cast::<u8>())
}
