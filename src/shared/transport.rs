//! Transport abstraction: a single duplex byte channel.
//!
//! The serve loop treats the channel opaquely as a pair of read/write
//! halves. [`StdioTransport`] covers the common case of a process speaking
//! over its standard streams; [`IoTransport`] wraps any
//! `AsyncRead`/`AsyncWrite` pair, which is how the tests drive a server
//! through `tokio::io::duplex`.

use tokio::io::{AsyncRead, AsyncWrite, Stdin, Stdout};

/// A duplex byte channel that can be split into read and write halves.
pub trait Transport: Send {
    /// The reading half.
    type Reader: AsyncRead + Unpin + Send;
    /// The writing half.
    type Writer: AsyncWrite + Unpin + Send;

    /// Consume the transport, yielding its two halves.
    fn into_split(self) -> (Self::Reader, Self::Writer);
}

/// Transport over an arbitrary reader/writer pair.
#[derive(Debug)]
pub struct IoTransport<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> IoTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Create a transport from a reader and a writer.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R, W> Transport for IoTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    type Reader = R;
    type Writer = W;

    fn into_split(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

/// Transport over the process standard streams.
///
/// Anything the embedding process logs must go to stderr; stdout belongs to
/// the protocol.
#[derive(Debug, Default)]
pub struct StdioTransport {
    _private: (),
}

impl StdioTransport {
    /// Create a stdio transport.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for StdioTransport {
    type Reader = Stdin;
    type Writer = Stdout;

    fn into_split(self) -> (Stdin, Stdout) {
        (tokio::io::stdin(), tokio::io::stdout())
    }
}
