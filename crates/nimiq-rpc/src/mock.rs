//! A scripted [`Transport`] for dispatcher tests. Pops canned reply bodies
//! in FIFO order and records every request body it sees.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::RpcError;
use crate::transport::Transport;

pub(crate) struct MockTransport {
    replies: Mutex<VecDeque<Result<String, RpcError>>>,
    requests: Mutex<Vec<serde_json::Value>>,
}

impl MockTransport {
    pub(crate) fn builder() -> MockTransportBuilder {
        MockTransportBuilder {
            replies: VecDeque::new(),
        }
    }

    /// Every request envelope sent so far, in order.
    pub(crate) fn requests(&self) -> Vec<serde_json::Value> {
        self.requests.lock().expect("mock lock").clone()
    }

    /// The `id` field of every request envelope sent so far, in order.
    pub(crate) fn sent_ids(&self) -> Vec<u64> {
        self.requests()
            .iter()
            .map(|req| req["id"].as_u64().expect("request id is an integer"))
            .collect()
    }
}

pub(crate) struct MockTransportBuilder {
    replies: VecDeque<Result<String, RpcError>>,
}

impl MockTransportBuilder {
    /// Script a well-formed envelope wrapping `result`.
    pub(crate) fn with_result(mut self, result: serde_json::Value) -> Self {
        let body = serde_json::json!({ "jsonrpc": "2.0", "result": result, "id": 0 });
        self.replies
            .push_back(Ok(serde_json::to_string(&body).expect("reply serializes")));
        self
    }

    /// Script a raw reply body, for malformed-response tests.
    pub(crate) fn with_body(mut self, body: &str) -> Self {
        self.replies.push_back(Ok(body.to_owned()));
        self
    }

    /// Script a transport-level failure.
    pub(crate) fn with_failure(mut self, error: RpcError) -> Self {
        self.replies.push_back(Err(error));
        self
    }

    pub(crate) fn build(self) -> MockTransport {
        MockTransport {
            replies: Mutex::new(self.replies),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn exchange(&self, body: String) -> Result<String, RpcError> {
        let parsed = serde_json::from_str(&body).expect("request body is JSON");
        self.requests.lock().expect("mock lock").push(parsed);
        self.replies
            .lock()
            .expect("mock lock")
            .pop_front()
            .expect("mock transport has a scripted reply")
    }
}
