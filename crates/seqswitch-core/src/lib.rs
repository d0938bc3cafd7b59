//! seqswitch-core: active sequencer selection for replicated rollup nodes.
//!
//! # Overview
//!
//! A replicated sequencer set exposes several rollup (and matching execution)
//! RPC endpoints, of which exactly one is the active sequencer at any time.
//! This crate keeps callers pointed at that one without them noticing a swap:
//!
//! - [`RollupClient`] / [`EthClient`]: the client capabilities a connection provides
//! - [`Dialer`]: pluggable connection factory, one per capability
//! - [`ActiveRollupProvider`]: throttled recheck, ordered failover and failback
//!   over one list of rollup endpoints
//! - [`ActiveEndpointProvider`]: keeps an execution client pinned to the same
//!   node the rollup provider selected
//! - [`ProviderError`] / [`CandidateFailures`]: structured, aggregated errors

pub mod client;
pub mod config;
pub mod dial;
pub mod endpoint;
pub mod error;
pub mod rollup;

pub use client::{EthClient, RollupClient};
pub use config::ActiveProviderConfig;
pub use dial::Dialer;
pub use endpoint::ActiveEndpointProvider;
pub use error::{CandidateFailure, CandidateFailures, FailureReason, ProviderError, TransportError};
pub use rollup::ActiveRollupProvider;
pub use tokio_util::sync::CancellationToken;
