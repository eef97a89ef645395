//! Multi-bulk frame reading and writing over a byte stream.
//!
//! One `RespCodec` wraps one connection and owns its read/write buffers.
//! Reads block until a complete frame is buffered; writes stage the whole
//! reply in a reusable buffer and flush it with a single write call.

use crate::error::{ProtocolError, ProtocolResult};
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};
use types::Value;

/// Default bound on a single frame, matching the transport default.
pub const MAX_FRAME_SIZE_DEFAULT: usize = 16 * 1024 * 1024; // 16MB

const CRLF: &[u8] = b"\r\n";
const READ_CHUNK: usize = 64 * 1024; // 64KB

/// Frame codec over one bidirectional byte stream.
pub struct RespCodec<S> {
    stream: S,
    read_buf: BytesMut,
    write_buf: BytesMut,
    max_frame_size: usize,
    closed: bool,
}

impl<S> RespCodec<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self::with_max_frame_size(stream, MAX_FRAME_SIZE_DEFAULT)
    }

    pub fn with_max_frame_size(stream: S, max_frame_size: usize) -> Self {
        Self {
            stream,
            read_buf: BytesMut::with_capacity(READ_CHUNK),
            write_buf: BytesMut::with_capacity(READ_CHUNK),
            max_frame_size,
            closed: false,
        }
    }

    /// Read one complete request frame.
    ///
    /// Returns `Ok(Some(fields))` for a regular frame, `Ok(None)` when the
    /// peer sent a null or empty array (teardown signal). Fails with
    /// `ConnectionClosed` on clean EOF between frames and `Malformed` on
    /// anything the framing rules reject, including EOF mid-frame.
    pub async fn read_frame(&mut self) -> ProtocolResult<Option<Vec<Bytes>>> {
        let header = self.read_line(true).await?;
        let count = parse_prefixed_int(&header, b'*', "array header")?;

        if count <= 0 {
            debug!(count, "teardown frame received");
            return Ok(None);
        }

        let mut total = 0usize;
        let mut fields = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let bulk_header = self.read_line(false).await?;
            let len = parse_prefixed_int(&bulk_header, b'$', "bulk length")?;
            if len < 0 {
                return Err(ProtocolError::malformed(
                    "null bulk string in request frame",
                    total,
                ));
            }
            let len = len as usize;
            total = total.saturating_add(len);
            if total > self.max_frame_size {
                return Err(ProtocolError::FrameTooLarge {
                    size: total,
                    max: self.max_frame_size,
                });
            }

            let field = self.read_exact_bytes(len).await?;
            let crlf = self.read_exact_bytes(2).await?;
            if &crlf[..] != CRLF {
                return Err(ProtocolError::malformed(
                    "bulk string not terminated by CRLF",
                    total,
                ));
            }
            fields.push(field);
        }

        trace!(fields = fields.len(), bytes = total, "frame read");
        Ok(Some(fields))
    }

    /// Write a data reply using the multi-bulk value conventions.
    pub async fn write_value(&mut self, value: &Value) -> ProtocolResult<()> {
        self.write_buf.clear();
        encode_value(&mut self.write_buf, value)?;
        self.flush_write_buf().await
    }

    /// Write a typed error reply, distinct from any data reply.
    pub async fn write_error(&mut self, message: &str) -> ProtocolResult<()> {
        self.write_buf.clear();
        self.write_buf.extend_from_slice(b"-");
        // Line breaks would terminate the reply early.
        for byte in message.bytes() {
            self.write_buf
                .extend_from_slice(if byte == b'\r' || byte == b'\n' {
                    b" "
                } else {
                    std::slice::from_ref(&byte)
                });
        }
        self.write_buf.extend_from_slice(CRLF);
        self.flush_write_buf().await
    }

    /// Flush and release the stream. Safe to call on every exit path.
    pub async fn close(&mut self) -> ProtocolResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.stream
            .shutdown()
            .await
            .map_err(|e| ProtocolError::io("failed to shut down stream", e))?;
        Ok(())
    }

    async fn flush_write_buf(&mut self) -> ProtocolResult<()> {
        self.stream
            .write_all(&self.write_buf)
            .await
            .map_err(|e| ProtocolError::io("failed to write reply", e))?;
        self.stream
            .flush()
            .await
            .map_err(|e| ProtocolError::io("failed to flush stream", e))?;
        trace!(bytes = self.write_buf.len(), "reply written");
        Ok(())
    }

    /// Read up to and including the next CRLF, returning the line without it.
    async fn read_line(&mut self, at_frame_boundary: bool) -> ProtocolResult<Bytes> {
        loop {
            if let Some(pos) = find_crlf(&self.read_buf) {
                let line = self.read_buf.split_to(pos).freeze();
                let _ = self.read_buf.split_to(2);
                return Ok(line);
            }
            if self.read_buf.len() > self.max_frame_size {
                return Err(ProtocolError::FrameTooLarge {
                    size: self.read_buf.len(),
                    max: self.max_frame_size,
                });
            }
            self.fill(at_frame_boundary && self.read_buf.is_empty())
                .await?;
        }
    }

    /// Read exactly `len` bytes of payload.
    async fn read_exact_bytes(&mut self, len: usize) -> ProtocolResult<Bytes> {
        while self.read_buf.len() < len {
            self.fill(false).await?;
        }
        Ok(self.read_buf.split_to(len).freeze())
    }

    /// Pull more bytes from the stream into the read buffer.
    ///
    /// EOF at a frame boundary is a clean disconnect; EOF anywhere else means
    /// the peer died mid-frame.
    async fn fill(&mut self, clean_eof_ok: bool) -> ProtocolResult<()> {
        let n = self
            .stream
            .read_buf(&mut self.read_buf)
            .await
            .map_err(|e| ProtocolError::io("failed to read from stream", e))?;
        if n == 0 {
            if clean_eof_ok {
                return Err(ProtocolError::ConnectionClosed);
            }
            return Err(ProtocolError::malformed(
                "unexpected end of stream inside a frame",
                self.read_buf.len(),
            ));
        }
        Ok(())
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF)
}

/// Parse `<marker><signed int>` out of a header line.
fn parse_prefixed_int(line: &[u8], marker: u8, what: &str) -> ProtocolResult<i64> {
    let (first, digits) = match line.split_first() {
        Some(split) => split,
        None => return Err(ProtocolError::malformed(format!("empty {}", what), 0)),
    };
    if *first != marker {
        return Err(ProtocolError::malformed(
            format!(
                "expected {} marker '{}', got '{}'",
                what, marker as char, *first as char
            ),
            0,
        ));
    }

    let (negative, digits) = match digits.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, digits),
    };
    if digits.is_empty() {
        return Err(ProtocolError::malformed(format!("empty {} value", what), 0));
    }

    let mut value: i64 = 0;
    for byte in digits {
        if !byte.is_ascii_digit() {
            return Err(ProtocolError::malformed(
                format!("non-digit in {}", what),
                0,
            ));
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add((byte - b'0') as i64))
            .ok_or_else(|| ProtocolError::malformed(format!("{} overflows", what), 0))?;
    }
    Ok(if negative { -value } else { value })
}

/// Serialize one native value with the multi-bulk conventions.
fn encode_value(buf: &mut BytesMut, value: &Value) -> ProtocolResult<()> {
    match value {
        Value::Nil => buf.extend_from_slice(b"$-1\r\n"),
        Value::Bool(b) => {
            buf.extend_from_slice(if *b { b":1\r\n" } else { b":0\r\n" });
        }
        Value::Int(n) => {
            buf.extend_from_slice(format!(":{}\r\n", n).as_bytes());
        }
        Value::Float(f) => encode_bulk(buf, format!("{}", f).as_bytes()),
        Value::Text(s) => encode_bulk(buf, s.as_bytes()),
        Value::Bytes(b) => encode_bulk(buf, b),
        Value::List(items) => {
            buf.extend_from_slice(format!("*{}\r\n", items.len()).as_bytes());
            for item in items {
                encode_value(buf, item)?;
            }
        }
        Value::Object(_) => {
            return Err(ProtocolError::Unencodable {
                kind: value.kind(),
            });
        }
    }
    Ok(())
}

fn encode_bulk(buf: &mut BytesMut, data: &[u8]) {
    buf.extend_from_slice(format!("${}\r\n", data.len()).as_bytes());
    buf.extend_from_slice(data);
    buf.extend_from_slice(CRLF);
}
