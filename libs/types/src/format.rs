//! Negotiated wire encodings for request arguments and reply values.
//!
//! Clients declare both in the optional header field of a request frame.
//! Values are case-insensitive on the wire; both default to `auto`.

use std::fmt;
use thiserror::Error;

/// A header named an encoding the server does not speak.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported content type '{given}': valid types are {valid}")]
pub struct FormatError {
    pub given: String,
    pub valid: &'static str,
}

/// Argument payload encoding declared by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    /// Try the binary envelope first, fall back to JSON.
    #[default]
    Auto,
    /// Payload is a JSON document.
    Json,
    /// Payload is a binary schema envelope.
    Capnp,
}

impl ContentType {
    /// Parse a header value, case-insensitively.
    pub fn parse(value: &str) -> Result<Self, FormatError> {
        match value.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "json" => Ok(Self::Json),
            "capnp" => Ok(Self::Capnp),
            _ => Err(FormatError {
                given: value.to_string(),
                valid: "['json', 'capnp', 'auto']",
            }),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Auto => "auto",
            Self::Json => "json",
            Self::Capnp => "capnp",
        };
        write!(f, "{}", s)
    }
}

/// Reply value encoding requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    /// Structural binary form (same as `capnp`).
    #[default]
    Auto,
    /// Text form.
    Json,
    /// Structural binary form.
    Capnp,
    /// Schema-native binary form.
    Msgpack,
}

impl ResponseType {
    /// Parse a header value, case-insensitively.
    pub fn parse(value: &str) -> Result<Self, FormatError> {
        match value.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "json" => Ok(Self::Json),
            "capnp" => Ok(Self::Capnp),
            "msgpack" => Ok(Self::Msgpack),
            _ => Err(FormatError {
                given: value.to_string(),
                valid: "['json', 'capnp', 'msgpack', 'auto']",
            }),
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Auto => "auto",
            Self::Json => "json",
            Self::Capnp => "capnp",
            Self::Msgpack => "msgpack",
        };
        write!(f, "{}", s)
    }
}
