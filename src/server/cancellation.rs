//! Per-request context handed to handlers.

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::types::RequestId;

/// Extra context passed to request handlers.
///
/// Carries the correlation id and a cancellation token scoped to this call.
/// The token fires on per-call timeout and on server shutdown; handlers
/// should honor it promptly, though the core never forcibly kills a
/// non-cooperating handler. It only stops waiting.
#[derive(Clone, Debug)]
pub struct RequestHandlerExtra {
    /// Correlation id of the request being handled.
    pub request_id: RequestId,
    /// Cancellation token for the request.
    pub cancellation_token: CancellationToken,
}

impl RequestHandlerExtra {
    /// Create new handler context.
    pub fn new(request_id: RequestId, cancellation_token: CancellationToken) -> Self {
        Self {
            request_id,
            cancellation_token,
        }
    }

    /// Check if the request has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    /// Wait for the request to be cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancellation_token.cancelled()
    }
}
