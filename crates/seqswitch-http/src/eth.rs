//! Execution-layer client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use seqswitch_core::{Dialer, EthClient, TransportError};

use crate::rpc::{parse_quantity, RpcConnection};

/// HTTP JSON-RPC client for an execution node.
pub struct HttpEthClient {
    conn: RpcConnection,
}

impl HttpEthClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            conn: RpcConnection::new(url, timeout)?,
        })
    }

    async fn quantity(&self, method: &str) -> Result<u64, TransportError> {
        let hex: String = self.conn.call(method, vec![]).await?;
        parse_quantity(&hex)
    }
}

#[async_trait]
impl EthClient for HttpEthClient {
    async fn chain_id(&self) -> Result<u64, TransportError> {
        self.quantity("eth_chainId").await
    }

    async fn block_number(&self) -> Result<u64, TransportError> {
        self.quantity("eth_blockNumber").await
    }

    fn url(&self) -> &str {
        self.conn.url()
    }

    fn close(&self) {
        self.conn.close();
    }
}

/// Dials [`HttpEthClient`]s, checking reachability with `eth_chainId`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpEthDialer;

#[async_trait]
impl Dialer<dyn EthClient> for HttpEthDialer {
    async fn dial(&self, url: &str, timeout: Duration) -> Result<Arc<dyn EthClient>, TransportError> {
        let client = HttpEthClient::new(url, timeout)?;
        let chain_id = client.chain_id().await?;
        tracing::debug!(url, chain_id, "eth client connected");
        Ok(Arc::new(client))
    }
}
