//! Request dispatch: validation, routing, execution, correlation.
//!
//! The dispatcher is the sole writer of the in-flight set. An id is added
//! when dispatch begins and removed exactly once when the response is
//! produced; a second completion for the same id is a logic fault that is
//! detected and suppressed rather than sent.

use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::{json, Value};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::types::{Request, RequestId, Response};

use super::cancellation::RequestHandlerExtra;
use super::registry::ToolRegistry;
use super::CATALOG_TOOL;

pub(crate) struct Dispatcher {
    registry: Arc<ToolRegistry>,
    in_flight: DashMap<RequestId, CancellationToken>,
    limiter: Option<Arc<Semaphore>>,
    call_timeout: Option<Duration>,
}

impl Dispatcher {
    pub(crate) fn new(
        registry: Arc<ToolRegistry>,
        max_concurrency: Option<usize>,
        call_timeout: Option<Duration>,
    ) -> Self {
        Self {
            registry,
            in_flight: DashMap::new(),
            limiter: max_concurrency.map(|n| Arc::new(Semaphore::new(n))),
            call_timeout,
        }
    }

    /// Dispatch one request to completion.
    ///
    /// Returns `None` when no response must be written: the id was already
    /// in flight, or completion raced (defensive double-completion check).
    pub(crate) async fn dispatch(
        &self,
        request: Request,
        shutdown: &CancellationToken,
    ) -> Option<Response> {
        let token = shutdown.child_token();
        match self.in_flight.entry(request.id.clone()) {
            Entry::Occupied(_) => {
                // Answering would orphan the first call or double-respond;
                // both break correlation, so the request is dropped.
                warn!(id = %request.id, "request id already in flight, discarding");
                return None;
            },
            Entry::Vacant(slot) => {
                slot.insert(token.clone());
            },
        }

        let _permit = match &self.limiter {
            Some(limiter) => match Arc::clone(limiter).acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(_) => {
                    return self.complete(
                        &request.id,
                        Err(Error::internal("concurrency limiter closed")),
                    );
                },
            },
            None => None,
        };

        let outcome = self.execute(&request, &token).await;
        self.complete(&request.id, outcome)
    }

    async fn execute(&self, request: &Request, token: &CancellationToken) -> Result<Value> {
        if request.tool == CATALOG_TOOL {
            return Ok(json!({ "tools": self.registry.list() }));
        }

        let def = self
            .registry
            .lookup(&request.tool)
            .ok_or_else(|| Error::tool_not_found(request.tool.clone()))?;

        // Must reject before the handler can observe any side effect.
        def.validate_input(&request.args)?;

        let extra = RequestHandlerExtra::new(request.id.clone(), token.clone());
        let invocation = def.handler().handle(request.args.clone(), extra);

        let result = match self.call_timeout {
            Some(limit) => {
                tokio::select! {
                    res = invocation => res,
                    () = token.cancelled() => Err(Error::Cancelled),
                    () = tokio::time::sleep(limit) => {
                        debug!(id = %request.id, tool = %request.tool, "call timed out");
                        token.cancel();
                        Err(Error::Cancelled)
                    },
                }
            },
            None => {
                tokio::select! {
                    res = invocation => res,
                    () = token.cancelled() => Err(Error::Cancelled),
                }
            },
        };

        let value = result?;
        def.validate_output(&value)?;
        Ok(value)
    }

    fn complete(&self, id: &RequestId, outcome: Result<Value>) -> Option<Response> {
        if self.in_flight.remove(id).is_none() {
            error!(%id, "duplicate completion for request id, response suppressed");
            return None;
        }
        Some(match outcome {
            Ok(value) => Response::success(id.clone(), value),
            Err(err) => {
                debug!(%id, code = %err.failure_code(), "call failed: {err}");
                Response::failure(id.clone(), &err)
            },
        })
    }

    /// Cancel every in-flight call (process shutdown path).
    pub(crate) fn cancel_all(&self) {
        for entry in self.in_flight.iter() {
            entry.value().cancel();
        }
    }

    #[cfg(test)]
    pub(crate) fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }
}
