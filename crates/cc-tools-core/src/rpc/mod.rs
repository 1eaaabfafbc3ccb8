//! JSON-RPC 2.0 protocol types.
//!
//! All communication between a hook binary and the daemon is newline-
//! delimited JSON-RPC 2.0 over a Unix domain socket. This module mirrors
//! the shape of the teacher crate's `omni-daemon::protocol` module, with
//! one deliberate generalization: the request `id` is polymorphic (string,
//! number, or null on the wire) rather than a bare `u64`, because the
//! daemon must interoperate with hook clients that mint ids however they
//! like.

mod id;

pub mod codec;

pub use id::RequestId;

use serde::{Deserialize, Serialize};

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Protocol version. Must be exactly `"2.0"`.
    pub jsonrpc: String,
    /// Request id, echoed verbatim (in canonical string form) in the response.
    pub id: RequestId,
    /// Method name: `lint`, `test`, `statusline`, or `stats`.
    pub method: String,
    /// Raw method parameters, interpreted per-method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// A JSON-RPC 2.0 response. Exactly one of `result`/`error` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Protocol version, always `"2.0"`.
    pub jsonrpc: String,
    /// Id of the request this responds to.
    pub id: RequestId,
    /// Successful result, mutually exclusive with `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RpcResult>,
    /// Error result, mutually exclusive with `result`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// The `result` payload shape shared by `lint`/`test`/`statusline`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RpcResult {
    /// Text to show the caller (hook message or statusline text).
    pub output: String,
    /// Small string-to-string metadata map. Carries `via = "server"` so
    /// the daemon client can recognize a genuine server response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<std::collections::BTreeMap<String, String>>,
    /// Hook exit code, when applicable (`lint`/`test`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Free-form status string, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    /// Numeric error code. See [`error_codes`].
    pub code: i32,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured error detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Response {
    /// Build a success response.
    #[must_use]
    pub fn success(id: RequestId, result: RpcResult) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Build an error response.
    #[must_use]
    pub fn error(id: RequestId, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// Standard and cc-tools-specific JSON-RPC error codes.
pub mod error_codes {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid Request object (e.g. wrong `jsonrpc`).
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method does not exist.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal server error (includes lock contention and runner failure).
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Parameters shared by the `lint` and `test` methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunParams {
    /// Hook envelope JSON, passed through as a string (the same bytes a
    /// hook binary would otherwise feed the orchestrator on stdin).
    pub input: String,
    /// Project identifier used as the in-memory lock key. Empty means
    /// "do not lock".
    #[serde(default)]
    pub project: String,
    /// Deadline override in milliseconds. `0` or absent uses the method's
    /// default.
    #[serde(default)]
    pub timeout: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_carries_exactly_one_of_result_or_error() {
        let ok = Response::success(RequestId::from(1u64), RpcResult::default());
        assert!(ok.result.is_some());
        assert!(ok.error.is_none());

        let err = Response::error(RequestId::from(1u64), error_codes::INTERNAL_ERROR, "boom");
        assert!(err.result.is_none());
        assert!(err.error.is_some());
    }

    #[test]
    fn request_round_trips_through_json() {
        let req = Request {
            jsonrpc: "2.0".into(),
            id: RequestId::from("abc"),
            method: "lint".into(),
            params: Some(serde_json::json!({"input": "{}"})),
        };
        let encoded = serde_json::to_string(&req).unwrap();
        let decoded: Request = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.id, req.id);
        assert_eq!(decoded.method, "lint");
    }
}
