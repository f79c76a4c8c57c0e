//! Server-side dispatch core: registry, dispatcher, and the transport loop.

pub mod builder;
pub mod cancellation;
pub(crate) mod dispatcher;
pub mod registry;
pub mod simple_tool;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result, TransportError};
use crate::shared::frame::{encode_response, FrameDecoder};
use crate::shared::transport::{StdioTransport, Transport};
use crate::types::{Response, ServerInfo};

pub use builder::ServerBuilder;
pub use cancellation::RequestHandlerExtra;
pub use registry::{ToolDefinition, ToolRegistry};
pub use simple_tool::{SimpleTool, SyncTool};

use dispatcher::Dispatcher;

/// Reserved request name answering with the tool catalog.
pub const CATALOG_TOOL: &str = "tools/list";

/// Handler for tool execution.
///
/// Implementations must be safe to call concurrently; they may perform
/// arbitrary external I/O and should honor the cancellation token in
/// `extra` promptly (best effort).
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Handle a tool call with schema-validated arguments.
    async fn handle(&self, args: Value, extra: RequestHandlerExtra) -> Result<Value>;
}

/// The dispatch core for one long-lived connection.
///
/// An explicit context object: identity, catalog, and dispatch
/// configuration, with lifecycle bounded to a single [`Server::run`]. No
/// process-wide state.
#[allow(missing_debug_implementations)]
pub struct Server {
    pub(crate) info: ServerInfo,
    pub(crate) registry: Arc<ToolRegistry>,
    pub(crate) dispatcher: Arc<Dispatcher>,
    pub(crate) shutdown_grace: Duration,
    pub(crate) max_frame_size: usize,
}

enum ExitReason {
    /// Peer closed the stream.
    Eof,
    /// Explicit shutdown signal.
    Shutdown,
    /// Unrecoverable transport failure.
    Fatal(Error),
}

impl Server {
    /// Start building a server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Server identity.
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// The immutable tool catalog.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Serve one connection until the transport closes.
    ///
    /// Returns `Ok(())` on clean closure (the embedder maps this to exit
    /// code 0) and `Err` on an unrecoverable transport error (non-zero
    /// exit, after reporting to the operator's error channel).
    pub async fn run<T: Transport>(&self, transport: T) -> Result<()> {
        self.run_with_shutdown(transport, CancellationToken::new())
            .await
    }

    /// Serve over the process standard streams.
    pub async fn run_stdio(&self) -> Result<()> {
        self.run(StdioTransport::new()).await
    }

    /// Serve one connection; `shutdown` triggers a graceful stop where
    /// in-flight calls may finish within the grace period.
    pub async fn run_with_shutdown<T: Transport>(
        &self,
        transport: T,
        shutdown: CancellationToken,
    ) -> Result<()> {
        let (mut reader, mut writer) = transport.into_split();
        let mut decoder = FrameDecoder::new(self.max_frame_size);
        let mut tasks: JoinSet<Option<Response>> = JoinSet::new();

        info!(
            server = %self.info.name,
            version = %self.info.version,
            tools = self.registry.len(),
            "serving"
        );

        let reason = loop {
            tokio::select! {
                read = reader.read_buf(decoder.buffer_mut()) => match read {
                    Ok(0) => break ExitReason::Eof,
                    Ok(_) => self.spawn_decoded(&mut decoder, &mut tasks, &shutdown),
                    Err(e) => {
                        error!("transport read failed: {e}");
                        break ExitReason::Fatal(e.into());
                    },
                },
                // Responses are written here, one full frame at a time;
                // completion order is whatever the handlers produce.
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Some(response) = flatten_join(joined) {
                        self.write_response(&mut writer, &response).await?;
                    }
                },
                () = shutdown.cancelled() => break ExitReason::Shutdown,
            }
        };

        if matches!(reason, ExitReason::Shutdown) {
            self.dispatcher.cancel_all();
        }
        self.drain(&mut writer, &mut tasks).await;
        let _ = writer.shutdown().await;

        match reason {
            ExitReason::Fatal(e) => Err(e),
            ExitReason::Eof => {
                info!("transport closed, exiting cleanly");
                Ok(())
            },
            ExitReason::Shutdown => {
                info!("shutdown complete");
                Ok(())
            },
        }
    }

    /// Pull every complete record out of the decoder and start a dispatch
    /// task per request. The read loop never waits on a handler, so one
    /// slow call cannot starve the others.
    fn spawn_decoded(
        &self,
        decoder: &mut FrameDecoder,
        tasks: &mut JoinSet<Option<Response>>,
        shutdown: &CancellationToken,
    ) {
        loop {
            match decoder.decode_next() {
                Ok(Some(request)) => {
                    debug!(id = %request.id, tool = %request.tool, "request decoded");
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let token = shutdown.clone();
                    tasks.spawn(async move { dispatcher.dispatch(request, &token).await });
                },
                Ok(None) => break,
                Err(e) => warn!("discarding malformed record: {e}"),
            }
        }
    }

    /// Let in-flight calls finish within the grace period, still writing
    /// their responses; stragglers are cancelled and aborted.
    async fn drain(&self, writer: &mut impl WriteHalf, tasks: &mut JoinSet<Option<Response>>) {
        let deadline = tokio::time::sleep(self.shutdown_grace);
        tokio::pin!(deadline);

        while !tasks.is_empty() {
            tokio::select! {
                Some(joined) = tasks.join_next() => {
                    if let Some(response) = flatten_join(joined) {
                        if let Err(e) = self.write_response(writer, &response).await {
                            warn!("dropping response during drain: {e}");
                            break;
                        }
                    }
                },
                () = &mut deadline => {
                    warn!(remaining = tasks.len(), "grace period elapsed, aborting in-flight calls");
                    self.dispatcher.cancel_all();
                    tasks.shutdown().await;
                    break;
                },
            }
        }
    }

    async fn write_response(
        &self,
        writer: &mut impl WriteHalf,
        response: &Response,
    ) -> Result<()> {
        let bytes = match encode_response(response, self.max_frame_size) {
            Ok(bytes) => bytes,
            Err(TransportError::FrameTooLarge { max }) => {
                // The caller still gets a correlated answer rather than
                // silence.
                warn!(id = %response.id, "response exceeds maximum frame size, replacing");
                let failure = Response::failure(
                    response.id.clone(),
                    &Error::internal(format!("response exceeds maximum frame size of {max} bytes")),
                );
                encode_response(&failure, self.max_frame_size).map_err(Error::Transport)?
            },
            Err(e) => return Err(e.into()),
        };
        writer.write_all(&bytes).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Alias bound for the write half used by the serve loop.
trait WriteHalf: AsyncWrite + Unpin + Send {}
impl<W: AsyncWrite + Unpin + Send> WriteHalf for W {}

fn flatten_join(joined: std::result::Result<Option<Response>, JoinError>) -> Option<Response> {
    match joined {
        Ok(response) => response,
        Err(e) => {
            // A panicking handler loses its response; the fault is logged
            // rather than propagated to the whole connection.
            error!("dispatch task failed: {e}");
            None
        },
    }
}

