//! Shared components: framing, transport, logging.

pub mod frame;
pub mod logging;
pub mod transport;

pub use frame::{encode_response, FrameDecoder};
pub use logging::init_logging;
pub use transport::{IoTransport, StdioTransport, Transport};
