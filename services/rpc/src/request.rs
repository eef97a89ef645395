//! Inbound request model.
//!
//! A request is the ordered field list of one frame: the command address,
//! optional arguments, and an optional JSON header map carrying encoding
//! negotiation hints. Header values are validated lazily so commands that
//! never consult them (the built-ins) are not affected by a bad header.

use crate::error::{RpcError, RpcResult};
use bytes::Bytes;
use types::{ContentType, ResponseType};

/// One parsed inbound frame.
#[derive(Debug)]
pub struct Request {
    address: String,
    args: Vec<Bytes>,
    headers: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Request {
    /// Split a frame's fields into address, arguments and headers.
    ///
    /// The final field of a frame with three or more fields is taken as the
    /// header map when it parses as a JSON object carrying a negotiation
    /// key; anything else stays a positional argument.
    pub fn parse(fields: Vec<Bytes>) -> RpcResult<Self> {
        let mut fields = fields;
        if fields.is_empty() {
            return Err(RpcError::invalid_payload("empty request frame"));
        }

        let headers = if fields.len() >= 3 {
            match parse_header_map(fields.last().map(|f| f.as_ref()).unwrap_or_default()) {
                Some(map) => {
                    fields.pop();
                    Some(map)
                }
                None => None,
            }
        } else {
            None
        };

        let address = String::from_utf8_lossy(&fields[0]).into_owned();
        let args = fields.split_off(1);

        Ok(Self {
            address,
            args,
            headers,
        })
    }

    /// The dotted command address string, as sent.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Positional argument fields, in wire order.
    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    /// The payload field of a schema-typed command.
    pub fn payload(&self) -> RpcResult<&[u8]> {
        self.args
            .first()
            .map(|b| b.as_ref())
            .ok_or_else(|| RpcError::invalid_payload("schema command requires an argument payload"))
    }

    /// Negotiated argument encoding, defaulting to `auto`.
    pub fn content_type(&self) -> RpcResult<ContentType> {
        match self.header_str("content_type")? {
            Some(value) => Ok(ContentType::parse(value)?),
            None => Ok(ContentType::Auto),
        }
    }

    /// Negotiated reply encoding, defaulting to `auto`.
    pub fn response_type(&self) -> RpcResult<ResponseType> {
        match self.header_str("response_type")? {
            Some(value) => Ok(ResponseType::parse(value)?),
            None => Ok(ResponseType::Auto),
        }
    }

    fn header_str(&self, key: &str) -> RpcResult<Option<&str>> {
        let Some(headers) = &self.headers else {
            return Ok(None);
        };
        match headers.get(key) {
            None => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(RpcError::invalid_payload(format!(
                "header '{}' must be a string, got {}",
                key, other
            ))),
        }
    }
}

/// Recognize a header map field.
fn parse_header_map(field: &[u8]) -> Option<serde_json::Map<String, serde_json::Value>> {
    let doc: serde_json::Value = serde_json::from_slice(field).ok()?;
    let map = match doc {
        serde_json::Value::Object(map) => map,
        _ => return None,
    };
    if map.contains_key("content_type") || map.contains_key("response_type") {
        Some(map)
    } else {
        None
    }
}
