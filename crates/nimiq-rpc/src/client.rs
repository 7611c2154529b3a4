//! The request dispatcher.
//!
//! [`Client`] builds JSON-RPC envelopes, hands them to the injected
//! [`Transport`], and resolves exactly one reply per call. All three entry
//! points share one async code path; they differ only in how the caller
//! consumes the outcome (awaited future, blocked thread, or callback).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::decode::FromJson;
use crate::error::RpcError;
use crate::protocol::{parse_server_error, JsonRpcRequest, JsonRpcResponse};
use crate::transport::{HttpTransport, Transport};

/// JSON-RPC client for a Nimiq node.
///
/// Cheap to clone; clones share the transport and the request-id counter.
/// The counter starts at 0 and advances by exactly one per successfully
/// decoded reply, so a failed exchange or decode re-uses its id on the next
/// call. Counter updates are atomic, which closes the lost-update race that
/// an unsynchronized shared counter would have under concurrent calls;
/// concurrent in-flight calls may still send the same id, since an id is
/// only consumed once its reply decodes.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
    handle: Handle,
}

struct Inner {
    transport: Box<dyn Transport>,
    next_id: AtomicU64,
}

impl Client {
    /// Connect to a node RPC endpoint over HTTP.
    ///
    /// Credentials may be embedded in the URL or passed explicitly; see
    /// [`HttpTransport::new`]. Must be called from within a Tokio runtime:
    /// the runtime handle is captured to drive blocking and callback
    /// dispatch.
    pub fn connect(url: &str, user: Option<&str>, pass: Option<&str>) -> Result<Self, RpcError> {
        Ok(Self::with_transport(HttpTransport::new(url, user, pass)?))
    }

    /// Build a client over an arbitrary transport. Must be called from
    /// within a Tokio runtime.
    pub fn with_transport<T: Transport>(transport: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport: Box::new(transport),
                next_id: AtomicU64::new(0),
            }),
            handle: Handle::current(),
        }
    }

    /// Generic JSON-RPC entry point: send `method` with positional `params`
    /// and decode the reply as `T`.
    ///
    /// `params` must already be JSON values; shaping them is the caller's
    /// contract. Exactly one request is sent, with no retry.
    pub async fn call<T: FromJson>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<T, RpcError> {
        self.inner.dispatch(method, params).await
    }

    /// Blocking-mode dispatch: suspend the calling thread until the reply
    /// arrives, then return the decoded result.
    ///
    /// The exchange runs on the captured runtime while this thread waits on
    /// a oneshot channel fed by the async completion, so the wait cannot
    /// starve the I/O. Must not be called from a runtime worker thread.
    pub fn call_blocking<T>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<T, RpcError>
    where
        T: FromJson + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        let method = method.to_owned();
        self.handle.spawn(async move {
            // A dropped receiver means the caller gave up; nothing to deliver.
            let _ = tx.send(inner.dispatch::<T>(&method, params).await);
        });
        rx.blocking_recv().unwrap_or(Err(RpcError::Dropped))
    }

    /// Callback-mode dispatch: return immediately and invoke `handler`
    /// exactly once, on a runtime worker thread, when the exchange
    /// completes. No ordering is guaranteed relative to other in-flight
    /// calls.
    pub fn call_with<T, F>(&self, method: &str, params: Vec<serde_json::Value>, handler: F)
    where
        T: FromJson + Send + 'static,
        F: FnOnce(Result<T, RpcError>) + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let method = method.to_owned();
        self.handle.spawn(async move {
            handler(inner.dispatch::<T>(&method, params).await);
        });
    }
}

impl Inner {
    async fn dispatch<T: FromJson>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<T, RpcError> {
        // The id is read here but only consumed after the reply decodes;
        // a failed exchange or decode leaves the counter untouched.
        let id = self.next_id.load(Ordering::Relaxed);
        debug!(
            rpc.id = id,
            rpc.method = method,
            rpc.params = params.len(),
            "rpc call"
        );

        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };
        let body =
            serde_json::to_string(&request).expect("JSON-RPC envelope of JSON values serializes");

        let raw = self.transport.exchange(body).await?;

        let envelope: JsonRpcResponse = serde_json::from_str(&raw).map_err(|e| {
            warn!(rpc.id = id, rpc.method = method, body = %raw, "undecodable rpc response");
            RpcError::InvalidResponse(format!("decode JSON-RPC response: {e}"))
        })?;

        if let Some(err) = envelope.error {
            return Err(parse_server_error(err));
        }

        let result = envelope.result.unwrap_or(serde_json::Value::Null);
        let decoded = match T::from_json(&result) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(
                    rpc.id = id,
                    rpc.method = method,
                    error = %e,
                    body = %raw,
                    "rpc result decode failed"
                );
                return Err(e);
            }
        };

        self.next_id.fetch_add(1, Ordering::Relaxed);
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use crate::mock::MockTransport;

    use super::*;

    fn client_over(mock: &Arc<MockTransport>) -> Client {
        Client::with_transport(Arc::clone(mock))
    }

    #[tokio::test]
    async fn ids_increase_by_one_per_success() {
        let mock = Arc::new(
            MockTransport::builder()
                .with_result(json!(1))
                .with_result(json!(2))
                .with_result(json!(3))
                .build(),
        );
        let client = client_over(&mock);

        for expected in [1u64, 2, 3] {
            let n: u64 = client
                .call("blockNumber", Vec::new())
                .await
                .expect("call succeeds");
            assert_eq!(n, expected);
        }
        assert_eq!(mock.sent_ids(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn failed_decode_does_not_consume_id() {
        let mock = Arc::new(
            MockTransport::builder()
                .with_result(json!("not a number"))
                .with_result(json!(7))
                .build(),
        );
        let client = client_over(&mock);

        let err = client
            .call::<u64>("blockNumber", Vec::new())
            .await
            .expect_err("string result cannot decode as u64");
        assert!(matches!(err, RpcError::Decode(_)));

        let n: u64 = client
            .call("blockNumber", Vec::new())
            .await
            .expect("well-formed call succeeds");
        assert_eq!(n, 7);
        // The failed call's id was never consumed.
        assert_eq!(mock.sent_ids(), vec![0, 0]);
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response_and_keeps_id() {
        let mock = Arc::new(
            MockTransport::builder()
                .with_body("{nope")
                .with_result(json!(5))
                .build(),
        );
        let client = client_over(&mock);

        let err = client
            .call::<u64>("blockNumber", Vec::new())
            .await
            .expect_err("body is not JSON");
        assert!(matches!(err, RpcError::InvalidResponse(_)));

        let n: u64 = client
            .call("blockNumber", Vec::new())
            .await
            .expect("next call succeeds");
        assert_eq!(n, 5);
        assert_eq!(mock.sent_ids(), vec![0, 0]);
    }

    #[tokio::test]
    async fn server_error_object_is_reported_and_keeps_id() {
        let mock = Arc::new(
            MockTransport::builder()
                .with_body(r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":0}"#)
                .with_result(json!(9))
                .build(),
        );
        let client = client_over(&mock);

        let err = client
            .call::<u64>("bogus", Vec::new())
            .await
            .expect_err("server error is reported");
        assert!(matches!(err, RpcError::Server { code: -32601, .. }));

        let n: u64 = client
            .call("blockNumber", Vec::new())
            .await
            .expect("next call succeeds");
        assert_eq!(n, 9);
        assert_eq!(mock.sent_ids(), vec![0, 0]);
    }

    #[tokio::test]
    async fn transport_failure_is_reported() {
        let mock = Arc::new(
            MockTransport::builder()
                .with_failure(RpcError::Transport("connection refused".to_owned()))
                .build(),
        );
        let client = client_over(&mock);

        let err = client
            .call::<u64>("blockNumber", Vec::new())
            .await
            .expect_err("transport failure surfaces");
        assert!(matches!(err, RpcError::Transport(_)));
        assert_eq!(mock.sent_ids(), vec![0]);
    }

    #[tokio::test]
    async fn absent_result_decodes_as_null() {
        let mock = Arc::new(
            MockTransport::builder()
                .with_body(r#"{"jsonrpc":"2.0","id":0}"#)
                .with_result(json!(null))
                .build(),
        );
        let client = client_over(&mock);

        let absent: Option<u64> = client
            .call("getTransactionByHash", vec![json!("nope")])
            .await
            .expect("absent result is null");
        assert_eq!(absent, None);

        let null: Option<u64> = client
            .call("getTransactionByHash", vec![json!("nope")])
            .await
            .expect("null result decodes");
        assert_eq!(null, None);

        // Both replies decoded successfully, so both consumed an id.
        assert_eq!(mock.sent_ids(), vec![0, 1]);
    }

    #[tokio::test]
    async fn envelope_carries_method_and_params() {
        let mock = Arc::new(MockTransport::builder().with_result(json!(true)).build());
        let client = client_over(&mock);

        let enabled: bool = client
            .call("log", vec![json!("*"), json!("info")])
            .await
            .expect("call succeeds");
        assert!(enabled);

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["jsonrpc"], "2.0");
        assert_eq!(requests[0]["method"], "log");
        assert_eq!(requests[0]["params"], json!(["*", "info"]));
    }

    #[test]
    fn blocking_call_returns_decoded_value() {
        let rt = tokio::runtime::Runtime::new().expect("runtime builds");
        let mock = Arc::new(MockTransport::builder().with_result(json!(99)).build());
        let client = rt.block_on(async { Client::with_transport(Arc::clone(&mock)) });

        // This thread is not a runtime worker, so blocking here is safe.
        let n: u64 = client
            .call_blocking("blockNumber", Vec::new())
            .expect("blocking call succeeds");
        assert_eq!(n, 99);
        assert_eq!(mock.sent_ids(), vec![0]);
    }

    #[test]
    fn blocking_call_reports_decode_failure() {
        let rt = tokio::runtime::Runtime::new().expect("runtime builds");
        let mock = Arc::new(
            MockTransport::builder()
                .with_result(json!("not a number"))
                .build(),
        );
        let client = rt.block_on(async { Client::with_transport(Arc::clone(&mock)) });

        let err = client
            .call_blocking::<u64>("blockNumber", Vec::new())
            .expect_err("decode failure surfaces");
        assert!(matches!(err, RpcError::Decode(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn callback_mode_invokes_handler_exactly_once() {
        let mock = Arc::new(MockTransport::builder().with_result(json!(5)).build());
        let client = client_over(&mock);

        let (tx, rx) = std::sync::mpsc::channel();
        client.call_with::<u64, _>("blockNumber", Vec::new(), move |outcome| {
            tx.send(outcome).expect("test receiver is alive");
        });

        let outcome = tokio::task::spawn_blocking(move || {
            let first = rx
                .recv_timeout(Duration::from_secs(5))
                .expect("handler runs once");
            // The sender was moved into the handler and dropped with it, so a
            // second invocation is impossible; the channel must now be closed.
            assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
            first
        })
        .await
        .expect("blocking task joins");

        assert_eq!(outcome.expect("call succeeds"), 5);
    }
}
