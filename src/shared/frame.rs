//! Message framing for the duplex stream.
//!
//! Records are newline-delimited JSON: one UTF-8 encoded object per line,
//! terminated by `\n`. The decoder is incremental and tolerates arbitrarily
//! fragmented input; record boundaries survive any read chunking. A record
//! with no terminator within the configured maximum size is discarded up to
//! the next terminator so a single oversized or corrupt record never wedges
//! the connection.

use bytes::{Bytes, BytesMut};

use crate::error::TransportError;
use crate::types::{Request, Response};

/// Incremental decoder turning a byte stream into [`Request`] records.
#[derive(Debug)]
pub struct FrameDecoder {
    buf: BytesMut,
    max_frame: usize,
    /// Set while skipping the remainder of an oversized record.
    discarding: bool,
}

impl FrameDecoder {
    /// Create a decoder enforcing the given maximum record size in bytes.
    pub fn new(max_frame: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(8 * 1024),
            max_frame,
            discarding: false,
        }
    }

    /// The internal buffer the transport reads into.
    pub fn buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// Append bytes to the decode buffer.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Decode the next complete record.
    ///
    /// Returns `Ok(Some(request))` for one decoded record, `Ok(None)` when
    /// more bytes are needed, and `Err` for a malformed or oversized record.
    /// Errors are recoverable: the offending record has been consumed and
    /// decoding may continue.
    pub fn decode_next(&mut self) -> Result<Option<Request>, TransportError> {
        loop {
            if self.discarding {
                match self.buf.iter().position(|&b| b == b'\n') {
                    Some(pos) => {
                        let _ = self.buf.split_to(pos + 1);
                        self.discarding = false;
                        return Err(TransportError::FrameTooLarge {
                            max: self.max_frame,
                        });
                    },
                    None => {
                        self.buf.clear();
                        return Ok(None);
                    },
                }
            }

            match self.buf.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    let line = self.buf.split_to(pos + 1);
                    let line = &line[..pos];
                    let line = trim_cr(line);
                    if line.is_empty() {
                        continue;
                    }
                    if line.len() > self.max_frame {
                        return Err(TransportError::FrameTooLarge {
                            max: self.max_frame,
                        });
                    }
                    return match serde_json::from_slice::<Request>(line) {
                        Ok(request) => Ok(Some(request)),
                        Err(e) => Err(TransportError::InvalidMessage(e.to_string())),
                    };
                },
                None => {
                    if self.buf.len() > self.max_frame {
                        // Oversized record still streaming in; skip until
                        // the next terminator.
                        self.buf.clear();
                        self.discarding = true;
                        return Ok(None);
                    }
                    return Ok(None);
                },
            }
        }
    }
}

/// Encode a response as one framed record, terminator included.
pub fn encode_response(response: &Response, max_frame: usize) -> Result<Bytes, TransportError> {
    let json = serde_json::to_vec(response)
        .map_err(|e| TransportError::InvalidMessage(e.to_string()))?;
    if json.len() > max_frame {
        return Err(TransportError::FrameTooLarge { max: max_frame });
    }
    let mut out = BytesMut::with_capacity(json.len() + 1);
    out.extend_from_slice(&json);
    out.extend_from_slice(b"\n");
    Ok(out.freeze())
}

fn trim_cr(line: &[u8]) -> &[u8] {
    match line.split_last() {
        Some((b'\r', rest)) => rest,
        _ => line,
    }
}
