//! Rollup node client (op-node style `admin_` / `optimism_` namespaces).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use seqswitch_core::{Dialer, RollupClient, TransportError};

use crate::rpc::RpcConnection;

/// HTTP JSON-RPC client for a rollup node.
pub struct HttpRollupClient {
    conn: RpcConnection,
}

impl HttpRollupClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            conn: RpcConnection::new(url, timeout)?,
        })
    }

    /// Node software version (`optimism_version`).
    pub async fn version(&self) -> Result<String, TransportError> {
        self.conn.call("optimism_version", vec![]).await
    }

    /// Raw sync status (`optimism_syncStatus`).
    pub async fn sync_status(&self) -> Result<Value, TransportError> {
        self.conn.call("optimism_syncStatus", vec![]).await
    }
}

#[async_trait]
impl RollupClient for HttpRollupClient {
    async fn sequencer_active(&self) -> Result<bool, TransportError> {
        self.conn.call("admin_sequencerActive", vec![]).await
    }

    fn url(&self) -> &str {
        self.conn.url()
    }

    fn close(&self) {
        self.conn.close();
    }
}

/// Dials [`HttpRollupClient`]s, checking reachability with `optimism_version`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpRollupDialer;

#[async_trait]
impl Dialer<dyn RollupClient> for HttpRollupDialer {
    async fn dial(&self, url: &str, timeout: Duration) -> Result<Arc<dyn RollupClient>, TransportError> {
        let client = HttpRollupClient::new(url, timeout)?;
        let version = client.version().await?;
        tracing::debug!(url, version = %version, "rollup client connected");
        Ok(Arc::new(client))
    }
}
