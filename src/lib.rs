//! # toolrpc
//!
//! A tool registration and dispatch core for request/response serving over
//! a single long-lived duplex byte stream (typically process stdio).
//!
//! The crate provides:
//! - A catalog of callable operations with JSON-schema-described inputs and
//!   outputs
//! - Newline-delimited JSON framing tolerant of arbitrarily fragmented reads
//! - Concurrent dispatch of in-flight calls with per-call cancellation and
//!   optional timeouts
//! - Correlated, serialized response writes over the shared transport
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use serde_json::json;
//! use toolrpc::{ServerBuilder, SyncTool, ToolDefinition};
//!
//! #[tokio::main]
//! async fn main() -> toolrpc::Result<()> {
//!     toolrpc::init_logging();
//!
//!     let server = ServerBuilder::new()
//!         .name("petstore")
//!         .version("1.0.0")
//!         .tool(
//!             ToolDefinition::new("echo", SyncTool::new(Ok))
//!                 .with_description("Echo the arguments back")
//!                 .with_input_schema(json!({
//!                     "type": "object",
//!                     "properties": {"text": {"type": "string"}},
//!                     "required": ["text"]
//!                 }))?,
//!         )
//!         .build()?;
//!
//!     server.run_stdio().await
//! }
//! ```
//!
//! Handlers with dependencies are plain types implementing [`ToolHandler`];
//! construct them with their storage clients or API handles passed in
//! explicitly and register the instance:
//!
//! ```rust
//! use async_trait::async_trait;
//! use serde_json::Value;
//! use toolrpc::{RequestHandlerExtra, ToolHandler};
//!
//! struct GetPet { /* database handle, http client, ... */ }
//!
//! #[async_trait]
//! impl ToolHandler for GetPet {
//!     async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> toolrpc::Result<Value> {
//!         Ok(serde_json::json!({"name": "Fluffy", "status": "available"}))
//!     }
//! }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::return_self_not_must_use)]

pub mod error;
pub mod server;
pub mod shared;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result, TransportError};
pub use server::{
    RequestHandlerExtra, Server, ServerBuilder, SimpleTool, SyncTool, ToolDefinition, ToolHandler,
    ToolRegistry, CATALOG_TOOL,
};
pub use shared::{
    encode_response, init_logging, FrameDecoder, IoTransport, StdioTransport, Transport,
};
pub use types::{
    Failure, FailureCode, Outcome, Request, RequestId, Response, ServerInfo, ToolInfo,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

/// Default maximum size in bytes of a single wire record (4 MiB).
///
/// Payloads of any size up to this bound are supported; the bound is
/// configurable per server via
/// [`ServerBuilder::max_frame_size`](server::ServerBuilder::max_frame_size).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 4 * 1024 * 1024;

/// Default grace period in milliseconds that shutdown waits for in-flight
/// calls before forcing exit.
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 5_000;
