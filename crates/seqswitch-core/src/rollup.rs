//! Active sequencer selection over one ordered list of rollup endpoints.
//!
//! Selection rules:
//! - Candidates are visited in list order starting at index 0, so the
//!   lowest-index active node always wins (failback to the primary).
//! - The selected node is re-checked at most once per `check_interval`;
//!   inside the window the held client is returned without any network call.
//! - Every handle dialed during a scan and not selected is closed before the
//!   scan moves on, including when the calling future is dropped mid-probe.
//! - A caller's cancellation never evicts the held client and never arms the
//!   recheck throttle for other callers.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

use crate::client::RollupClient;
use crate::config::ActiveProviderConfig;
use crate::dial::{bounded, dial_candidate, Dialer};
use crate::error::{CandidateFailures, FailureReason, ProviderError};

/// A handle dialed during a scan; closed on drop unless it gets installed.
struct CloseOnDrop(Option<Arc<dyn RollupClient>>);

impl CloseOnDrop {
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        if let Some(client) = self.0.take() {
            client.close();
        }
    }
}

#[derive(Default)]
struct Selection {
    client: Option<Arc<dyn RollupClient>>,
    index: usize,
    last_check: Option<Instant>,
}

/// Keeps a client to whichever rollup endpoint is the active sequencer.
///
/// The held client is owned by the provider. Callers get a shared handle that
/// stays valid until the next swap, after which the provider closes it.
pub struct ActiveRollupProvider {
    urls: Vec<String>,
    dialer: Arc<dyn Dialer<dyn RollupClient>>,
    config: ActiveProviderConfig,
    span: Span,
    state: Mutex<Selection>,
}

impl ActiveRollupProvider {
    /// Build a provider and select the first active sequencer in `urls`.
    ///
    /// Fails if no candidate reports active; every handle dialed along the way
    /// has been closed by then. Cancelling `cancel` aborts construction.
    pub async fn new<D>(
        urls: Vec<String>,
        config: ActiveProviderConfig,
        dialer: D,
        cancel: &CancellationToken,
    ) -> Result<Self, ProviderError>
    where
        D: Dialer<dyn RollupClient>,
    {
        if urls.is_empty() {
            return Err(ProviderError::NoUrls { kind: "rollup" });
        }

        let provider = Self {
            span: tracing::info_span!("active_provider", layer = "rollup", candidates = urls.len()),
            urls,
            dialer: Arc::new(dialer),
            config,
            state: Mutex::new(Selection::default()),
        };

        {
            let mut state = provider.state.lock().await;
            provider
                .select(&mut state, cancel, None, CandidateFailures::new(), true)
                .await?;
        }
        Ok(provider)
    }

    /// Return the client for the active sequencer, re-checking it first if the
    /// recheck interval has elapsed and failing over if it is no longer active.
    pub async fn current_client(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<dyn RollupClient>, ProviderError> {
        self.current_selection(cancel).await.map(|(_, client)| client)
    }

    /// Like [`current_client`](Self::current_client), also reporting the selected index.
    pub async fn current_selection(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(usize, Arc<dyn RollupClient>), ProviderError> {
        let mut state = self.state.lock().await;
        self.ensure_active(&mut state, cancel).await?;
        match &state.client {
            Some(client) => Ok((state.index, client.clone())),
            None => Err(ProviderError::Unselected),
        }
    }

    /// Index of the selected candidate, or `None` if nothing is selected.
    pub async fn current_index(&self) -> Option<usize> {
        let state = self.state.lock().await;
        state.client.as_ref().map(|_| state.index)
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn config(&self) -> &ActiveProviderConfig {
        &self.config
    }

    /// Close the held client. Calls inside the current recheck window then
    /// return [`ProviderError::Unselected`]; a later call selects again.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if let Some(client) = state.client.take() {
            tracing::debug!(parent: &self.span, index = state.index, url = %client.url(), "closing rollup client");
            client.close();
        }
    }

    fn should_check(&self, state: &Selection) -> bool {
        state
            .last_check
            .map_or(true, |at| at.elapsed() >= self.config.check_interval)
    }

    async fn ensure_active(
        &self,
        state: &mut Selection,
        cancel: &CancellationToken,
    ) -> Result<(), ProviderError> {
        if !self.should_check(state) {
            tracing::trace!(parent: &self.span, "within recheck interval");
            return Ok(());
        }

        let mut failures = CandidateFailures::new();
        let mut skip = None;

        // Probe a clone: the held client stays installed until the probe has
        // actually answered, even if this future is dropped mid-await.
        if let Some(client) = state.client.clone() {
            let index = state.index;
            let url = &self.urls[index];
            match self.probe(cancel, client.as_ref()).await {
                Ok(()) => {
                    tracing::debug!(parent: &self.span, index, url = %url, "sequencer still active");
                    state.last_check = Some(Instant::now());
                    return Ok(());
                }
                Err(FailureReason::Cancelled) => {
                    tracing::debug!(parent: &self.span, index, url = %url, "recheck cancelled by caller");
                    return Err(ProviderError::Cancelled);
                }
                Err(reason) => {
                    tracing::warn!(
                        parent: &self.span,
                        index,
                        url = %url,
                        reason = %reason,
                        "current sequencer no longer active, failing over"
                    );
                    if let Some(client) = state.client.take() {
                        client.close();
                    }
                    failures.push(index, url.as_str(), reason);
                    // Already probed in this pass.
                    skip = Some(index);
                }
            }
        }

        let result = self.select(state, cancel, skip, failures, false).await;
        // Throttle retries even when nothing was found, unless the pass was
        // cut short by the caller's cancellation.
        if !cancel.is_cancelled() {
            state.last_check = Some(Instant::now());
        }
        result
    }

    /// Scan the list from index 0 and install the first active candidate.
    async fn select(
        &self,
        state: &mut Selection,
        cancel: &CancellationToken,
        skip: Option<usize>,
        mut failures: CandidateFailures,
        abort_on_cancel: bool,
    ) -> Result<(), ProviderError> {
        let timeout = self.config.network_timeout;

        for (index, url) in self.urls.iter().enumerate() {
            if skip == Some(index) {
                continue;
            }
            if abort_on_cancel && cancel.is_cancelled() {
                return Err(ProviderError::Cancelled);
            }

            let client =
                match dial_candidate(self.dialer.as_ref(), cancel, timeout, &self.span, url).await {
                    Ok(client) => client,
                    Err(reason) => {
                        tracing::warn!(parent: &self.span, index, url = %url, reason = %reason, "skipping unreachable sequencer");
                        failures.push(index, url.as_str(), reason);
                        continue;
                    }
                };

            let guard = CloseOnDrop(Some(client.clone()));
            match self.probe(cancel, client.as_ref()).await {
                Ok(()) => {
                    guard.disarm();
                    tracing::info!(parent: &self.span, index, url = %url, "selected active sequencer");
                    state.client = Some(client);
                    state.index = index;
                    state.last_check = Some(Instant::now());
                    return Ok(());
                }
                Err(reason) => {
                    tracing::info!(parent: &self.span, index, url = %url, reason = %reason, "sequencer not active, trying next");
                    drop(guard);
                    failures.push(index, url.as_str(), reason);
                }
            }
        }

        if abort_on_cancel && cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        tracing::warn!(parent: &self.span, failures = %failures, "no active sequencer found");
        Err(ProviderError::NoActiveSequencer(failures))
    }

    async fn probe(
        &self,
        cancel: &CancellationToken,
        client: &dyn RollupClient,
    ) -> Result<(), FailureReason> {
        let check = client.sequencer_active().instrument(self.span.clone());
        match bounded(cancel, self.config.network_timeout, check).await? {
            Ok(true) => Ok(()),
            Ok(false) => Err(FailureReason::Inactive),
            Err(e) => Err(FailureReason::Probe(e)),
        }
    }
}

impl Drop for ActiveRollupProvider {
    fn drop(&mut self) {
        if let Some(client) = self.state.get_mut().client.take() {
            client.close();
        }
    }
}

impl std::fmt::Debug for ActiveRollupProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveRollupProvider")
            .field("urls", &self.urls)
            .field("config", &self.config)
            .finish()
    }
}
