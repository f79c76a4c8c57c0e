//! Error types for the tool dispatch core.
//!
//! Per-call failures are recovered into failure responses carrying a stable
//! [`FailureCode`]; transport and startup failures surface to the embedder
//! through [`Result`].

use thiserror::Error;

use crate::types::FailureCode;

/// Result type alias for toolrpc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for toolrpc operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No tool is registered under the requested name.
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Request arguments did not match the tool's input schema.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The handler reported a domain failure.
    #[error("handler error: {0}")]
    Handler(#[from] anyhow::Error),

    /// Internal invariant breach or output schema violation.
    #[error("internal error: {0}")]
    Internal(String),

    /// The call was cancelled by timeout or shutdown.
    #[error("call cancelled")]
    Cancelled,

    /// A tool name was registered twice.
    #[error("duplicate tool registration: {0}")]
    DuplicateRegistration(String),

    /// Startup-time validation failure (bad schema, reserved name, missing
    /// builder field).
    #[error("validation error: {0}")]
    Validation(String),

    /// Transport-level errors.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Transport-specific errors.
#[derive(Error, Debug)]
pub enum TransportError {
    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Connection closed
    #[error("connection closed")]
    ConnectionClosed,

    /// A single record could not be decoded. Recoverable: the record is
    /// discarded and the connection stays usable.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// A record exceeded the maximum frame size.
    #[error("frame exceeds maximum size of {max} bytes")]
    FrameTooLarge {
        /// Configured maximum record size in bytes.
        max: usize,
    },
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(TransportError::Io(err.to_string()))
    }
}

impl Error {
    /// Create a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a handler-reported domain failure.
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(anyhow::anyhow!(message.into()))
    }

    /// Create an invalid-arguments error.
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    /// Create a tool-not-found error.
    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound(name.into())
    }

    /// Create a cancelled error.
    pub fn cancelled() -> Self {
        Self::Cancelled
    }

    /// Map this error onto the stable wire failure code.
    ///
    /// Errors outside the per-call taxonomy collapse to
    /// [`FailureCode::InternalError`] so no internal detail leaks to the
    /// caller.
    pub fn failure_code(&self) -> FailureCode {
        match self {
            Self::ToolNotFound(_) => FailureCode::ToolNotFound,
            Self::InvalidArguments(_) => FailureCode::InvalidArguments,
            Self::Handler(_) => FailureCode::HandlerError,
            Self::Cancelled => FailureCode::Cancelled,
            _ => FailureCode::InternalError,
        }
    }

    /// Whether transmitting this error's display text to the caller is safe.
    ///
    /// Internal faults get a generic message instead.
    pub(crate) fn is_caller_visible(&self) -> bool {
        matches!(
            self,
            Self::ToolNotFound(_) | Self::InvalidArguments(_) | Self::Handler(_) | Self::Cancelled
        )
    }
}
