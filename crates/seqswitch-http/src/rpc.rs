//! Minimal JSON-RPC 2.0 connection over `reqwest`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use seqswitch_core::TransportError;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Vec<Value>,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

impl JsonRpcResponse {
    fn into_result(self) -> Result<Value, TransportError> {
        match self.error {
            Some(err) => Err(TransportError::Rpc {
                code: err.code,
                message: err.message,
            }),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// One HTTP endpoint. Refuses calls once closed.
pub(crate) struct RpcConnection {
    url: String,
    http: reqwest::Client,
    timeout: Duration,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl RpcConnection {
    pub(crate) fn new(url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            http,
            timeout,
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        })
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!(url = %self.url, "rpc connection closed");
        }
    }

    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed {
                url: self.url.clone(),
            });
        }

        let req = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        let resp = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| self.map_reqwest(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Http(format!("HTTP {status}: {body}")));
        }

        let body: JsonRpcResponse = resp.json().await.map_err(|e| self.map_reqwest(e))?;
        let result = body.into_result()?;
        Ok(serde_json::from_value(result)?)
    }

    fn map_reqwest(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                ms: self.timeout.as_millis() as u64,
            }
        } else {
            TransportError::Http(e.to_string())
        }
    }
}

/// Parse a JSON-RPC hex quantity such as `"0x1a"`.
pub fn parse_quantity(value: &str) -> Result<u64, TransportError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| TransportError::Other(format!("quantity missing 0x prefix: {value}")))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| TransportError::Other(format!("invalid quantity {value}: {e}")))
}
