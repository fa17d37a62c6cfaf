use crate::error::{Result, SdkError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// JSON-RPC version
const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC request
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: u64,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC request
    pub fn new(method: String, params: Value, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method,
            params,
            id,
        }
    }
}

/// JSON-RPC response
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
    // Some nodes echo the id back as a string
    #[serde(default)]
    pub id: Value,
}

/// JSON-RPC error
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Unwrap the result. A JSON-RPC error object becomes
    /// [`SdkError::RpcRejected`] with the node's message.
    pub fn into_result(self) -> Result<Value> {
        if let Some(error) = self.error {
            return Err(SdkError::RpcRejected {
                code: Some(error.code),
                message: error.message,
            });
        }
        self.result
            .ok_or_else(|| SdkError::Network("Empty response".to_string()))
    }
}

/// Request/response channel to a node.
///
/// The HTTP transport is the production implementation; tests substitute a
/// scripted one.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one JSON-RPC call and return its `result`.
    ///
    /// # Errors
    /// `SdkError::Network` on transport failure, `SdkError::RpcRejected` when the
    /// node answers with a JSON-RPC error object.
    async fn send_request(&self, method: &str, params: Value) -> Result<Value>;

    /// Endpoint this transport talks to
    fn url(&self) -> &str;
}

/// JSON-RPC HTTP transport
#[derive(Clone)]
pub struct JsonRpcHttpTransport {
    client: reqwest::Client,
    url: String,
    request_id: Arc<AtomicU64>,
}

impl JsonRpcHttpTransport {
    /// Create a new JSON-RPC HTTP transport with a per-request timeout
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SdkError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url,
            request_id: Arc::new(AtomicU64::new(1)),
        })
    }
}

#[async_trait]
impl Transport for JsonRpcHttpTransport {
    async fn send_request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest::new(method.to_string(), params, id);
        tracing::trace!(method, id, url = %self.url, "Sending JSON-RPC request");

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| SdkError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SdkError::Network(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let json_response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| SdkError::Network(e.to_string()))?;

        json_response.into_result()
    }

    fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Debug for JsonRpcHttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcHttpTransport")
            .field("url", &self.url)
            .finish()
    }
}
