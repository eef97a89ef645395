//! Protocol-level errors for frame processing.
//!
//! These are the two fatal categories of the connection loop: a peer that
//! disconnects cleanly (`ConnectionClosed`, not reported back) and a peer
//! that sends bytes the framing layer cannot understand (everything else,
//! fatal to the connection). Per-request failures live in the dispatch layer.

use thiserror::Error;

/// Frame read/write errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Peer disconnected cleanly between frames. Not an error reply.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// Input that violates the multi-bulk framing rules.
    #[error("malformed frame: {detail} (offset: {offset})")]
    Malformed { detail: String, offset: usize },

    /// Frame or field larger than the configured bound.
    #[error("frame too large: {size} bytes exceeds maximum {max}")]
    FrameTooLarge { size: usize, max: usize },

    /// A value reached the writer that has no wire form of its own.
    #[error("unencodable value of kind '{kind}': encode it before framing")]
    Unencodable { kind: &'static str },

    /// Transport-level I/O failure.
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProtocolError {
    /// Create a malformed-frame error.
    pub fn malformed(detail: impl Into<String>, offset: usize) -> Self {
        Self::Malformed {
            detail: detail.into(),
            offset,
        }
    }

    /// Create an I/O error with context.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// True when the peer is simply gone and no reply should be attempted.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::ConnectionClosed)
    }
}

/// Result type for protocol operations.
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
