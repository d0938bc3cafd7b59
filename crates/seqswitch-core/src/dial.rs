//! The `Dialer` trait and the bounded dial/probe helpers used during scans.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

use crate::error::{FailureReason, TransportError};

/// Opens a new client connection for an endpoint URL.
///
/// Every call must produce a fresh, owned handle; providers never assume
/// dialing is cached. `timeout` is the per-dial budget the provider enforces.
#[async_trait]
pub trait Dialer<C: ?Sized + Send + Sync + 'static>: Send + Sync + 'static {
    async fn dial(&self, url: &str, timeout: Duration) -> Result<Arc<C>, TransportError>;
}

/// Run `fut` until it finishes, `timeout` elapses or `cancel` fires.
pub(crate) async fn bounded<F: Future>(
    cancel: &CancellationToken,
    timeout: Duration,
    fut: F,
) -> Result<F::Output, FailureReason> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FailureReason::Cancelled),
        res = tokio::time::timeout(timeout, fut) => res.map_err(|_| FailureReason::Timeout(timeout)),
    }
}

/// Dial one candidate under the provider's span, timeout and cancellation token.
pub(crate) async fn dial_candidate<C: ?Sized + Send + Sync + 'static>(
    dialer: &dyn Dialer<C>,
    cancel: &CancellationToken,
    timeout: Duration,
    span: &Span,
    url: &str,
) -> Result<Arc<C>, FailureReason> {
    bounded(cancel, timeout, dialer.dial(url, timeout).instrument(span.clone()))
        .await?
        .map_err(FailureReason::Dial)
}
