// crates/guestbook-rpc/src/envelope.rs
//
// JSON envelope carried by the single tonic `Call` method, and the
// structured error returned inside it.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use guestbook_core::{FieldIssue, GuestbookError};

// ---------------------------------------------------------------------------
// Request / Response
// ---------------------------------------------------------------------------

/// A JSON-RPC-style request envelope.
/// The client sends a method name and a JSON params payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// The RPC method to invoke (e.g., "guestbook/listEntries").
    pub method: String,
    /// JSON-encoded parameters for the method. Missing params read as `null`.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC-style response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// The result data (if success). `null` for procedures without a payload.
    pub result: Option<serde_json::Value>,
    /// Structured error (if not success).
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    pub fn ok(result: serde_json::Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(error: RpcError) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error),
        }
    }
}

// ---------------------------------------------------------------------------
// RpcError
// ---------------------------------------------------------------------------

/// Caller-visible error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcErrorKind {
    /// Params did not match the procedure's input schema.
    ValidationError,
    /// Protected procedure called without an authenticated caller.
    Unauthorized,
    /// The store failed while serving the call.
    StoreFailure,
    /// No procedure is registered under the requested method name.
    MethodNotFound,
    /// The envelope itself could not be read or parsed.
    InvalidRequest,
    /// Server-side failure unrelated to the store (e.g. response encoding).
    Internal,
}

impl RpcErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RpcErrorKind::ValidationError => "validation_error",
            RpcErrorKind::Unauthorized => "unauthorized",
            RpcErrorKind::StoreFailure => "store_failure",
            RpcErrorKind::MethodNotFound => "method_not_found",
            RpcErrorKind::InvalidRequest => "invalid_request",
            RpcErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for RpcErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error payload returned in `JsonRpcResponse::error`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct RpcError {
    pub kind: RpcErrorKind,
    pub message: String,
    /// Field-level detail for `validation_error`; empty otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<FieldIssue>,
}

impl RpcError {
    pub fn new(kind: RpcErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            issues: Vec::new(),
        }
    }

    pub fn validation(issues: Vec<FieldIssue>) -> Self {
        let message = issues
            .iter()
            .map(|issue| issue.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            kind: RpcErrorKind::ValidationError,
            message,
            issues,
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(RpcErrorKind::Unauthorized, "Authentication required")
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(RpcErrorKind::MethodNotFound, format!("Unknown method: {}", method))
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(RpcErrorKind::InvalidRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(RpcErrorKind::Internal, message)
    }
}

impl From<GuestbookError> for RpcError {
    fn from(e: GuestbookError) -> Self {
        match e {
            GuestbookError::Validation(issues) => RpcError::validation(issues),
            GuestbookError::Storage(msg) => RpcError::new(RpcErrorKind::StoreFailure, msg),
            GuestbookError::Serialization(msg) => RpcError::internal(msg),
        }
    }
}
