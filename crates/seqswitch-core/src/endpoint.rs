//! Execution + rollup endpoint pairs that always point at the same node.
//!
//! The eth and rollup URL lists are parallel: position `i` in both lists is the
//! same physical sequencer. The rollup provider owns selection; this layer
//! follows its index and swaps the eth client whenever the index moves.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::Span;

use crate::client::{EthClient, RollupClient};
use crate::config::ActiveProviderConfig;
use crate::dial::{dial_candidate, Dialer};
use crate::error::ProviderError;
use crate::rollup::ActiveRollupProvider;

#[derive(Default)]
struct EthSelection {
    client: Option<Arc<dyn EthClient>>,
    index: usize,
}

/// An [`ActiveRollupProvider`] plus an eth client kept on the same index.
pub struct ActiveEndpointProvider {
    rollup: ActiveRollupProvider,
    eth_urls: Vec<String>,
    eth_dialer: Arc<dyn Dialer<dyn EthClient>>,
    span: Span,
    eth: Mutex<EthSelection>,
}

impl ActiveEndpointProvider {
    /// Select the active sequencer from `rollup_urls`, then dial the eth
    /// endpoint at the same position in `eth_urls`.
    pub async fn new<E, R>(
        eth_urls: Vec<String>,
        rollup_urls: Vec<String>,
        config: ActiveProviderConfig,
        eth_dialer: E,
        rollup_dialer: R,
        cancel: &CancellationToken,
    ) -> Result<Self, ProviderError>
    where
        E: Dialer<dyn EthClient>,
        R: Dialer<dyn RollupClient>,
    {
        if rollup_urls.is_empty() {
            return Err(ProviderError::NoUrls { kind: "rollup" });
        }
        if eth_urls.len() != rollup_urls.len() {
            return Err(ProviderError::UrlCountMismatch {
                eth: eth_urls.len(),
                rollup: rollup_urls.len(),
            });
        }

        let rollup = ActiveRollupProvider::new(rollup_urls, config, rollup_dialer, cancel).await?;
        let provider = Self {
            rollup,
            span: tracing::info_span!("active_provider", layer = "eth", candidates = eth_urls.len()),
            eth_urls,
            eth_dialer: Arc::new(eth_dialer),
            eth: Mutex::new(EthSelection::default()),
        };

        // Dropping `provider` on failure closes the rollup client.
        let selected = provider.eth_client(cancel).await;
        match selected {
            Ok(_) => Ok(provider),
            Err(_) if cancel.is_cancelled() => Err(ProviderError::Cancelled),
            Err(e) => Err(e),
        }
    }

    /// Client for the active sequencer's rollup endpoint.
    pub async fn rollup_client(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<dyn RollupClient>, ProviderError> {
        self.rollup.current_client(cancel).await
    }

    /// Client for the active sequencer's execution endpoint.
    ///
    /// Re-validates the rollup selection first (subject to the recheck
    /// interval). If that moved to another index, the previous eth client is
    /// closed and the eth endpoint at the new index is dialed. A failed dial is
    /// returned as [`ProviderError::EthDial`] and retried on the next call; the
    /// rollup side keeps its new selection.
    pub async fn eth_client(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<dyn EthClient>, ProviderError> {
        let mut eth = self.eth.lock().await;
        let (index, _) = self.rollup.current_selection(cancel).await?;

        if let Some(client) = &eth.client {
            if eth.index == index {
                return Ok(client.clone());
            }
        }

        if let Some(previous) = eth.client.take() {
            tracing::info!(
                parent: &self.span,
                from = eth.index,
                to = index,
                url = %previous.url(),
                "sequencer changed, closing eth client"
            );
            previous.close();
        }

        let url = &self.eth_urls[index];
        let timeout = self.rollup.config().network_timeout;
        let client = dial_candidate(self.eth_dialer.as_ref(), cancel, timeout, &self.span, url)
            .await
            .map_err(|reason| {
                tracing::warn!(parent: &self.span, index, url = %url, reason = %reason, "failed to dial eth client");
                ProviderError::EthDial {
                    index,
                    url: url.clone(),
                    reason,
                }
            })?;

        tracing::info!(parent: &self.span, index, url = %url, "eth client connected");
        eth.client = Some(client.clone());
        eth.index = index;
        Ok(client)
    }

    /// Index of the selected sequencer, as seen by the rollup side.
    pub async fn current_index(&self) -> Option<usize> {
        self.rollup.current_index().await
    }

    /// Index the held eth client was dialed for, if one is held.
    pub async fn eth_index(&self) -> Option<usize> {
        let eth = self.eth.lock().await;
        eth.client.as_ref().map(|_| eth.index)
    }

    pub fn rollup(&self) -> &ActiveRollupProvider {
        &self.rollup
    }

    pub fn eth_urls(&self) -> &[String] {
        &self.eth_urls
    }

    /// Close both held clients.
    pub async fn close(&self) {
        {
            let mut eth = self.eth.lock().await;
            if let Some(client) = eth.client.take() {
                tracing::debug!(parent: &self.span, index = eth.index, url = %client.url(), "closing eth client");
                client.close();
            }
        }
        self.rollup.close().await;
    }
}

impl Drop for ActiveEndpointProvider {
    fn drop(&mut self) {
        if let Some(client) = self.eth.get_mut().client.take() {
            client.close();
        }
    }
}

impl std::fmt::Debug for ActiveEndpointProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveEndpointProvider")
            .field("rollup", &self.rollup)
            .field("eth_urls", &self.eth_urls)
            .finish()
    }
}
