//! Scripted in-memory node for tests and dry runs.
//!
//! Responses are queued per method and handed out in order. When a method's
//! queue holds a single entry, that entry is repeated for every later call.

use crate::client::jsonrpc::Transport;
use crate::error::{Result, SdkError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

/// One scripted answer
#[derive(Debug, Clone)]
pub enum MockResponse {
    Result(Value),
    RpcError { code: i64, message: String },
    NetworkFailure(String),
}

impl MockResponse {
    fn into_result(self) -> Result<Value> {
        match self {
            MockResponse::Result(value) => Ok(value),
            MockResponse::RpcError { code, message } => Err(SdkError::RpcRejected {
                code: Some(code),
                message,
            }),
            MockResponse::NetworkFailure(message) => Err(SdkError::Network(message)),
        }
    }
}

/// A call the mock received
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
    pub at: Instant,
}

#[derive(Default)]
struct MockState {
    responses: HashMap<String, VecDeque<MockResponse>>,
    calls: Vec<RecordedCall>,
}

#[derive(Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a response for `method`
    pub fn push(&self, method: &str, response: MockResponse) -> &Self {
        self.state()
            .responses
            .entry(method.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn push_result(&self, method: &str, result: Value) -> &Self {
        self.push(method, MockResponse::Result(result))
    }

    pub fn push_error(&self, method: &str, code: i64, message: &str) -> &Self {
        self.push(
            method,
            MockResponse::RpcError {
                code,
                message: message.to_string(),
            },
        )
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        self.state()
            .calls
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_request(&self, method: &str, params: Value) -> Result<Value> {
        let mut state = self.state();
        state.calls.push(RecordedCall {
            method: method.to_string(),
            params,
            at: Instant::now(),
        });

        let queue = state.responses.get_mut(method).ok_or_else(|| {
            SdkError::Network(format!("mock has no response for {}", method))
        })?;
        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        response
            .ok_or_else(|| SdkError::Network(format!("mock has no response for {}", method)))?
            .into_result()
    }

    fn url(&self) -> &str {
        "mock://node"
    }
}
