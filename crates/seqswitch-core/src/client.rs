//! Client capabilities a dialed connection provides.
//!
//! Both traits are object safe; providers hold handles as `Arc<dyn RollupClient>`
//! and `Arc<dyn EthClient>`. A handle owned by a provider must only be closed by
//! that provider.

use async_trait::async_trait;

use crate::error::TransportError;

/// A connection to a rollup node that can report whether it is the active sequencer.
#[async_trait]
pub trait RollupClient: Send + Sync + 'static {
    /// Ask the node whether it is currently the active sequencer.
    async fn sequencer_active(&self) -> Result<bool, TransportError>;

    /// The endpoint this client is connected to.
    fn url(&self) -> &str;

    /// Release the connection. Later calls may fail with [`TransportError::Closed`].
    fn close(&self);
}

/// A connection to an execution-layer node.
///
/// An execution endpoint has no activity signal of its own: it is live exactly
/// when the rollup endpoint at the same position reports active.
#[async_trait]
pub trait EthClient: Send + Sync + 'static {
    async fn chain_id(&self) -> Result<u64, TransportError>;

    async fn block_number(&self) -> Result<u64, TransportError>;

    fn url(&self) -> &str;

    fn close(&self);
}
