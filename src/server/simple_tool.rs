//! Closure adapters for tool handlers.
//!
//! Schemas and names live on [`crate::ToolDefinition`]; these adapters turn
//! a plain closure into the handler capability a definition carries, so
//! embedders can compose tools without writing a handler type per tool.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

use super::cancellation::RequestHandlerExtra;
use super::ToolHandler;

/// An asynchronous closure handler.
///
/// # Examples
///
/// ```rust
/// use toolrpc::{SimpleTool, ToolDefinition};
///
/// let tool = ToolDefinition::new(
///     "echo",
///     SimpleTool::new(|args, _extra| Box::pin(async move { Ok(args) })),
/// );
/// ```
pub struct SimpleTool<F>
where
    F: Fn(Value, RequestHandlerExtra) -> Pin<Box<dyn Future<Output = Result<Value>> + Send>>
        + Send
        + Sync,
{
    handler: F,
}

impl<F> fmt::Debug for SimpleTool<F>
where
    F: Fn(Value, RequestHandlerExtra) -> Pin<Box<dyn Future<Output = Result<Value>> + Send>>
        + Send
        + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleTool").finish()
    }
}

impl<F> SimpleTool<F>
where
    F: Fn(Value, RequestHandlerExtra) -> Pin<Box<dyn Future<Output = Result<Value>> + Send>>
        + Send
        + Sync,
{
    /// Wrap an async closure as a handler.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<F> ToolHandler for SimpleTool<F>
where
    F: Fn(Value, RequestHandlerExtra) -> Pin<Box<dyn Future<Output = Result<Value>> + Send>>
        + Send
        + Sync,
{
    async fn handle(&self, args: Value, extra: RequestHandlerExtra) -> Result<Value> {
        (self.handler)(args, extra).await
    }
}

/// A synchronous closure handler, for tools that never suspend.
pub struct SyncTool<F>
where
    F: Fn(Value) -> Result<Value> + Send + Sync,
{
    handler: F,
}

impl<F> fmt::Debug for SyncTool<F>
where
    F: Fn(Value) -> Result<Value> + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncTool").finish()
    }
}

impl<F> SyncTool<F>
where
    F: Fn(Value) -> Result<Value> + Send + Sync,
{
    /// Wrap a synchronous closure as a handler.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<F> ToolHandler for SyncTool<F>
where
    F: Fn(Value) -> Result<Value> + Send + Sync,
{
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> Result<Value> {
        (self.handler)(args)
    }
}
