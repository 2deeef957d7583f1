use crate::config::ChainConfig;
use crate::parser::errors::{OpError, OpErrorKind, OpResult};
use crate::rpc::{RpcRequest, RpcResponse, Transport};
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Serialize)]
struct Envelope<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a [Value],
}

///
/// JSON-RPC 1.0 over HTTP POST with optional basic auth.
///
/// bitcoind-style nodes answer RPC errors with HTTP 404/500 and a JSON
/// body, so such a body is handed back whatever the status is. A failed
/// response without a JSON-RPC envelope (an empty body, or plain text
/// such as `Work queue depth exceeded` with 503) is a transport error.
///
pub struct HttpTransport {
    client: Client,
    url: String,
    user: Option<String>,
    password: Option<String>,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(config: &ChainConfig) -> OpResult<HttpTransport> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.rpc_timeout))
            .build()?;
        let user = if config.rpc_user.is_empty() {
            None
        } else {
            Some(config.rpc_user.clone())
        };
        Ok(HttpTransport {
            client,
            url: config.rpc_url.clone(),
            user,
            password: Some(config.rpc_pass.clone()),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for HttpTransport {
    fn call(&self, request: &RpcRequest) -> OpResult<Vec<u8>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::to_vec(&Envelope {
            jsonrpc: "1.0",
            id,
            method: request.method,
            params: &request.params,
        })?;

        let mut builder = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(user) = &self.user {
            builder = builder.basic_auth(user, self.password.as_ref());
        }
        let response = builder.send()?;
        let status = response.status();
        let bytes = response.bytes()?;
        debug!(
            "rpc: {} id {} -> http {} ({} bytes)",
            request.method,
            id,
            status,
            bytes.len()
        );
        let enveloped = serde_json::from_slice::<RpcResponse<Value>>(&bytes).is_ok();
        if !status.is_success() && !enveloped {
            return Err(OpError::new(OpErrorKind::TransportError).join_msg(&format!(
                "{}: http status {}: {}",
                request.method,
                status,
                String::from_utf8_lossy(&bytes).trim()
            )));
        }
        Ok(bytes.to_vec())
    }
}
