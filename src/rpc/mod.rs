//!
//! JSON-RPC plumbing: request/response envelopes, the transport seam
//! and classification of node-reported errors.
//!

/// map node errors to not-found / transient / fatal
pub mod classify;

/// blocking HTTP transport
pub mod http;

use crate::parser::errors::OpResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

///
/// One call: method name and positional parameters, sent verbatim.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    pub method: &'static str,
    pub params: Vec<Value>,
}

impl RpcRequest {
    pub fn new(method: &'static str, params: Vec<Value>) -> RpcRequest {
        RpcRequest { method, params }
    }
}

/// Error object reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

///
/// Response envelope. Both fields may be present on the wire;
/// `error` wins.
///
#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

///
/// Sends a request to the node and returns the raw response body.
///
/// Connection handling, authentication and timeouts live behind this
/// trait; the client above it only speaks JSON-RPC.
///
pub trait Transport: Send + Sync {
    fn call(&self, request: &RpcRequest) -> OpResult<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn call(&self, request: &RpcRequest) -> OpResult<Vec<u8>> {
        (**self).call(request)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn call(&self, request: &RpcRequest) -> OpResult<Vec<u8>> {
        (**self).call(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_error_and_result() {
        let res: RpcResponse<String> = serde_json::from_str(
            r#"{"result": null, "error": {"code": -8, "message": "Block height out of range"}, "id": 1}"#,
        )
        .unwrap();
        assert!(res.result.is_none());
        assert_eq!(res.error.unwrap().code, -8);

        let res: RpcResponse<String> =
            serde_json::from_str(r#"{"result": "00ff", "error": null, "id": 1}"#).unwrap();
        assert_eq!(res.result.as_deref(), Some("00ff"));
        assert!(res.error.is_none());
    }

    #[test]
    fn test_request_serialization() {
        let req = RpcRequest::new("getblock", vec![Value::from("00ff"), Value::from(2)]);
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"method":"getblock","params":["00ff",2]}"#
        );
    }
}
