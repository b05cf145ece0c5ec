//! A scriptable JSON-RPC node for tests.
//!
//! [`JsonRpcMock`] answers single and batched JSON-RPC 2.0 requests from a
//! table of per-method handlers and runs on a [`wiremock::MockServer`], so
//! tests can count HTTP round trips with [`request_count`].
//!
//! ```ignore
//! let server = JsonRpcMock::new()
//!     .result("eth_blockNumber", json!("0x10"))
//!     .start()
//!     .await;
//! ```

use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// JSON-RPC error object returned by a handler.
#[derive(Debug, Clone)]
pub struct JsonRpcFault {
    pub code: i64,
    pub message: String,
}

impl JsonRpcFault {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

type Handler = Arc<dyn Fn(&Value) -> Result<Value, JsonRpcFault> + Send + Sync>;

#[derive(Clone, Default)]
pub struct JsonRpcMock {
    handlers: HashMap<String, Handler>,
    delay: Option<Duration>,
}

impl JsonRpcMock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `method` by calling `handler` with the request `params`.
    pub fn on<F>(mut self, method: &str, handler: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, JsonRpcFault> + Send + Sync + 'static,
    {
        self.handlers.insert(method.to_string(), Arc::new(handler));
        self
    }

    /// Answers `method` with a fixed result.
    pub fn result(self, method: &str, result: Value) -> Self {
        self.on(method, move |_| Ok(result.clone()))
    }

    /// Answers `method` with a fixed error.
    pub fn fault(self, method: &str, code: i64, message: &str) -> Self {
        let fault = JsonRpcFault::new(code, message);
        self.on(method, move |_| Err(fault.clone()))
    }

    /// Delays every HTTP response.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Starts a server answering every POST with this mock.
    pub async fn start(self) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(self)
            .mount(&server)
            .await;
        server
    }

    fn answer(&self, request: &Value) -> Value {
        let id = request.get("id").cloned().unwrap_or(Value::Null);
        let name = request.get("method").and_then(Value::as_str).unwrap_or_default();
        let params = request.get("params").cloned().unwrap_or(Value::Null);
        let outcome = match self.handlers.get(name) {
            Some(handler) => handler(&params),
            None => Err(JsonRpcFault::new(-32601, format!("method {name} not found"))),
        };
        match outcome {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err(fault) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": fault.code, "message": fault.message }
            }),
        }
    }
}

impl Respond for JsonRpcMock {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body = serde_json::from_slice::<Value>(&request.body).unwrap_or(Value::Null);
        let response = match body {
            Value::Array(batch) => Value::Array(batch.iter().map(|r| self.answer(r)).collect()),
            single => self.answer(&single),
        };
        let template = ResponseTemplate::new(200).set_body_json(response);
        match self.delay {
            Some(delay) => template.set_delay(delay),
            None => template,
        }
    }
}

/// Number of HTTP requests `server` has received.
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or_default()
}

/// JSON-RPC method names of every request `server` has received, batches
/// flattened.
pub async fn received_methods(server: &MockServer) -> Vec<String> {
    let requests = server.received_requests().await.unwrap_or_default();
    requests
        .iter()
        .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
        .flat_map(|body| match body {
            Value::Array(batch) => batch,
            single => vec![single],
        })
        .filter_map(|r| r.get("method").and_then(Value::as_str).map(str::to_string))
        .collect()
}
