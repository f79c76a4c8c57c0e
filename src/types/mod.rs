//! Wire and catalog data types.
//!
//! A connection carries newline-delimited JSON records. Each request is
//! `{"id": ..., "tool": "...", "args": ...}`; each response is either
//! `{"id": ..., "result": ...}` or
//! `{"id": ..., "error": {"code": "...", "message": "..."}}`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Correlation token linking a response to its originating request.
///
/// Unique per in-flight call on a given connection. Callers may use either
/// JSON strings or integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// String identifier
    String(String),
    /// Numeric identifier
    Number(i64),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// A decoded tool call request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Correlation id, unique per in-flight call.
    pub id: RequestId,
    /// Name of the tool to invoke.
    pub tool: String,
    /// Raw arguments; `null` when absent.
    #[serde(default)]
    pub args: Value,
}

/// Stable failure codes exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    /// No tool registered under the requested name.
    ToolNotFound,
    /// Arguments rejected by the tool's input schema.
    InvalidArguments,
    /// The handler reported a domain failure.
    HandlerError,
    /// Output schema violation or internal invariant breach.
    InternalError,
    /// The call timed out or the server shut down.
    Cancelled,
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ToolNotFound => "tool_not_found",
            Self::InvalidArguments => "invalid_arguments",
            Self::HandlerError => "handler_error",
            Self::InternalError => "internal_error",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// A structured failure description carried in a failure response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    /// Stable machine-readable code.
    pub code: FailureCode,
    /// Human-readable message; never raw internal detail.
    pub message: String,
}

/// Success payload or failure description of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The handler's result value.
    Result(Value),
    /// A per-call failure.
    Error(Failure),
}

/// A correlated response to a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Matches the originating request's id.
    pub id: RequestId,
    /// Success payload or failure description.
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Response {
    /// Build a success response.
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            id,
            outcome: Outcome::Result(result),
        }
    }

    /// Build a failure response from an error.
    ///
    /// Errors outside the per-call taxonomy are reported as
    /// `internal_error` with a generic message.
    pub fn failure(id: RequestId, err: &Error) -> Self {
        let message = if err.is_caller_visible() {
            err.to_string()
        } else {
            "internal error".to_string()
        };
        Self {
            id,
            outcome: Outcome::Error(Failure {
                code: err.failure_code(),
                message,
            }),
        }
    }

    /// Whether this response carries a success payload.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Result(_))
    }
}

/// Catalog entry describing one registered tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Unique tool name.
    pub name: String,
    /// Optional human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Structural description of accepted arguments.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    /// Structural description of results, when declared.
    #[serde(rename = "outputSchema", skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
}

/// Server identity reported alongside the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}
