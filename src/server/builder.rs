//! Builder pattern for constructing [`Server`] instances.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::ServerInfo;
use crate::{DEFAULT_MAX_FRAME_SIZE, DEFAULT_SHUTDOWN_GRACE_MS};

use super::dispatcher::Dispatcher;
use super::registry::{ToolDefinition, ToolRegistry};
use super::Server;

/// Builder for a [`Server`].
///
/// Registration happens here, once, before serving begins; a duplicate tool
/// name makes `build` fail fast.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use toolrpc::{ServerBuilder, SyncTool, ToolDefinition};
///
/// # fn example() -> toolrpc::Result<()> {
/// let server = ServerBuilder::new()
///     .name("petstore")
///     .version("1.0.0")
///     .tool(
///         ToolDefinition::new("echo", SyncTool::new(Ok))
///             .with_input_schema(json!({
///                 "type": "object",
///                 "properties": {"text": {"type": "string"}},
///                 "required": ["text"]
///             }))?,
///     )
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ServerBuilder {
    name: Option<String>,
    version: Option<String>,
    tools: Vec<ToolDefinition>,
    max_concurrency: Option<usize>,
    call_timeout: Option<Duration>,
    shutdown_grace: Duration,
    max_frame_size: usize,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            name: None,
            version: None,
            tools: Vec::new(),
            max_concurrency: None,
            call_timeout: None,
            shutdown_grace: Duration::from_millis(DEFAULT_SHUTDOWN_GRACE_MS),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Set the server name. Required.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the server version. Required.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Add a tool definition.
    pub fn tool(mut self, def: ToolDefinition) -> Self {
        self.tools.push(def);
        self
    }

    /// Add a batch of tool definitions, e.g. from a generated supplier.
    pub fn tools(mut self, defs: impl IntoIterator<Item = ToolDefinition>) -> Self {
        self.tools.extend(defs);
        self
    }

    /// Bound the number of concurrently executing handlers.
    ///
    /// Unbounded by default.
    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    /// Set a per-call timeout; a call still running when it elapses is
    /// cancelled and answered with a `cancelled` failure.
    ///
    /// No timeout by default.
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// How long shutdown waits for in-flight calls before forcing exit.
    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Maximum size in bytes of a single wire record.
    pub fn max_frame_size(mut self, bytes: usize) -> Self {
        self.max_frame_size = bytes;
        self
    }

    /// Build the [`Server`].
    ///
    /// Fails if name or version is missing, or on any registration error
    /// (duplicate name, reserved name, invalid schema).
    pub fn build(self) -> Result<Server> {
        let name = self
            .name
            .ok_or_else(|| Error::validation("server name is required"))?;
        let version = self
            .version
            .ok_or_else(|| Error::validation("server version is required"))?;

        let mut registry = ToolRegistry::new();
        for def in self.tools {
            registry.register(def)?;
        }
        let registry = Arc::new(registry);

        Ok(Server {
            info: ServerInfo { name, version },
            dispatcher: Arc::new(Dispatcher::new(
                Arc::clone(&registry),
                self.max_concurrency,
                self.call_timeout,
            )),
            registry,
            shutdown_grace: self.shutdown_grace,
            max_frame_size: self.max_frame_size,
        })
    }
}
