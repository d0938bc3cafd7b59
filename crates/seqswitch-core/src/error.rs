//! Transport and provider error types.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Errors a concrete client or dialer can report.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, non-2xx status, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The client was closed by its owner and refuses further calls.
    #[error("client for {url} is closed")]
    Closed { url: String },

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

/// Why a single candidate was rejected during a selection scan.
#[derive(Debug, Error)]
pub enum FailureReason {
    #[error("dial failed: {0}")]
    Dial(TransportError),

    #[error("health check failed: {0}")]
    Probe(TransportError),

    #[error("sequencer inactive")]
    Inactive,

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("cancelled")]
    Cancelled,
}

/// One rejected candidate.
#[derive(Debug)]
pub struct CandidateFailure {
    pub index: usize,
    pub url: String,
    pub reason: FailureReason,
}

/// Per-candidate failure reasons collected over one selection pass, in visit order.
#[derive(Debug, Default)]
pub struct CandidateFailures(Vec<CandidateFailure>);

impl CandidateFailures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the candidate at `index` was rejected.
    pub fn push(&mut self, index: usize, url: impl Into<String>, reason: FailureReason) {
        self.0.push(CandidateFailure {
            index,
            url: url.into(),
            reason,
        });
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateFailure> {
        self.0.iter()
    }
}

impl fmt::Display for CandidateFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "no candidates visited");
        }
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "[{}] {}: {}", failure.index, failure.url, failure.reason)?;
        }
        Ok(())
    }
}

/// Errors returned by the active providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider was given no candidate URLs.
    #[error("no {kind} urls configured")]
    NoUrls { kind: &'static str },

    /// The parallel eth and rollup URL lists differ in length.
    #[error("number of eth urls ({eth}) does not match number of rollup urls ({rollup})")]
    UrlCountMismatch { eth: usize, rollup: usize },

    /// Every candidate was dialed or probed and none is the active sequencer.
    #[error("failed to find an active sequencer: {0}")]
    NoActiveSequencer(CandidateFailures),

    /// The last selection pass found nothing and the recheck interval has not elapsed yet.
    #[error("no active sequencer selected, next attempt after the recheck interval")]
    Unselected,

    /// The rollup side moved to a new index but the matching eth endpoint could not be dialed.
    #[error("dialing eth client [{index}] {url}: {reason}")]
    EthDial {
        index: usize,
        url: String,
        reason: FailureReason,
    },

    /// The caller cancelled construction.
    #[error("operation cancelled")]
    Cancelled,
}

impl ProviderError {
    /// Returns `true` if a later call outside the recheck window may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NoActiveSequencer(_) | Self::Unselected | Self::EthDial { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_render_every_candidate() {
        let mut failures = CandidateFailures::new();
        failures.push(0, "http://a:9545", FailureReason::Inactive);
        failures.push(
            1,
            "http://b:9545",
            FailureReason::Dial(TransportError::Http("connection refused".into())),
        );
        failures.push(2, "http://c:9545", FailureReason::Timeout(Duration::from_secs(10)));

        assert_eq!(failures.len(), 3);
        assert_eq!(
            failures.to_string(),
            "[0] http://a:9545: sequencer inactive; \
             [1] http://b:9545: dial failed: HTTP error: connection refused; \
             [2] http://c:9545: timed out after 10s"
        );
    }

    #[test]
    fn exhausted_error_carries_failures() {
        let mut failures = CandidateFailures::new();
        failures.push(0, "rollup0", FailureReason::Probe(TransportError::Other("boom".into())));
        let err = ProviderError::NoActiveSequencer(failures);
        assert!(err.is_transient());
        assert_eq!(
            err.to_string(),
            "failed to find an active sequencer: [0] rollup0: health check failed: boom"
        );
    }

    #[test]
    fn empty_failures_display() {
        assert_eq!(CandidateFailures::new().to_string(), "no candidates visited");
    }

    #[test]
    fn config_errors_are_not_transient() {
        assert!(!ProviderError::NoUrls { kind: "rollup" }.is_transient());
        assert!(!ProviderError::UrlCountMismatch { eth: 1, rollup: 2 }.is_transient());
        assert!(!ProviderError::Cancelled.is_transient());
    }
}
