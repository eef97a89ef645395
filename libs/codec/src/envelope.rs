//! Binary schema-argument envelope.
//!
//! Schema-typed commands carry their payload as a single binary field: a
//! MessagePack-serialized 2-tuple `[id_or_null, schema_data]`. The identifier
//! travels outside the schema data so it can be assigned onto the decoded
//! value without the schema engine knowing about it.

use bytes::Bytes;
use rmpv::Value as MpValue;
use thiserror::Error;

/// Envelope decoding failures.
///
/// Kept separate from [`crate::ProtocolError`]: a bad envelope is a
/// per-request condition, and `auto` content negotiation treats it as
/// fallback-eligible rather than fatal.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("payload is not a MessagePack value: {detail}")]
    NotMessagePack { detail: String },

    #[error("envelope must be a 2-element array, got {got}")]
    WrongShape { got: String },

    #[error("envelope identifier must be an integer or nil, got {got}")]
    BadIdentifier { got: String },

    #[error("envelope data must be a binary or string value, got {got}")]
    BadData { got: String },
}

/// A decoded schema-argument envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub id: Option<i64>,
    pub data: Bytes,
}

/// Decode the `[id_or_null, schema_data]` tuple from a payload field.
pub fn decode_envelope(payload: &[u8]) -> Result<Envelope, EnvelopeError> {
    let mut cursor = payload;
    let value = rmpv::decode::read_value(&mut cursor).map_err(|e| EnvelopeError::NotMessagePack {
        detail: e.to_string(),
    })?;

    let items = match value {
        MpValue::Array(items) if items.len() == 2 => items,
        MpValue::Array(items) => {
            return Err(EnvelopeError::WrongShape {
                got: format!("{}-element array", items.len()),
            })
        }
        other => {
            return Err(EnvelopeError::WrongShape {
                got: kind_of(&other).to_string(),
            })
        }
    };

    let mut items = items.into_iter();
    let id_value = items.next().unwrap_or(MpValue::Nil);
    let data_value = items.next().unwrap_or(MpValue::Nil);

    let id = match id_value {
        MpValue::Nil => None,
        MpValue::Integer(n) => match n.as_i64() {
            Some(v) => Some(v),
            None => {
                return Err(EnvelopeError::BadIdentifier {
                    got: format!("out-of-range integer {}", n),
                })
            }
        },
        other => {
            return Err(EnvelopeError::BadIdentifier {
                got: kind_of(&other).to_string(),
            })
        }
    };

    let data = match data_value {
        MpValue::Binary(bytes) => Bytes::from(bytes),
        MpValue::String(s) => match s.into_str() {
            Some(s) => Bytes::from(s.into_bytes()),
            None => {
                return Err(EnvelopeError::BadData {
                    got: "non-utf8 string".to_string(),
                })
            }
        },
        other => {
            return Err(EnvelopeError::BadData {
                got: kind_of(&other).to_string(),
            })
        }
    };

    Ok(Envelope { id, data })
}

/// Encode an envelope; the inverse of [`decode_envelope`].
///
/// Servers only read envelopes, but the encoder keeps the format symmetric
/// for in-process clients and tests.
pub fn encode_envelope(id: Option<i64>, data: &[u8]) -> Vec<u8> {
    let tuple = MpValue::Array(vec![
        match id {
            Some(v) => MpValue::from(v),
            None => MpValue::Nil,
        },
        MpValue::Binary(data.to_vec()),
    ]);
    let mut out = Vec::new();
    // Writing into a Vec cannot fail.
    rmpv::encode::write_value(&mut out, &tuple).expect("msgpack encoding into Vec");
    out
}

fn kind_of(value: &MpValue) -> &'static str {
    match value {
        MpValue::Nil => "nil",
        MpValue::Boolean(_) => "bool",
        MpValue::Integer(_) => "integer",
        MpValue::F32(_) | MpValue::F64(_) => "float",
        MpValue::String(_) => "string",
        MpValue::Binary(_) => "binary",
        MpValue::Array(_) => "array",
        MpValue::Map(_) => "map",
        MpValue::Ext(..) => "ext",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_with_id() {
        let encoded = encode_envelope(Some(42), b"schema-bytes");
        let envelope = decode_envelope(&encoded).unwrap();
        assert_eq!(envelope.id, Some(42));
        assert_eq!(&envelope.data[..], b"schema-bytes");
    }

    #[test]
    fn test_round_trip_without_id() {
        let encoded = encode_envelope(None, b"\x00\x01\x02");
        let envelope = decode_envelope(&encoded).unwrap();
        assert_eq!(envelope.id, None);
        assert_eq!(&envelope.data[..], b"\x00\x01\x02");
    }

    #[test]
    fn test_string_data_is_accepted() {
        let tuple = MpValue::Array(vec![MpValue::Nil, MpValue::from("text-data")]);
        let mut encoded = Vec::new();
        rmpv::encode::write_value(&mut encoded, &tuple).unwrap();

        let envelope = decode_envelope(&encoded).unwrap();
        assert_eq!(&envelope.data[..], b"text-data");
    }

    #[test]
    fn test_not_msgpack_fails() {
        assert!(matches!(
            decode_envelope(b"{\"not\": \"msgpack\"}"),
            Err(EnvelopeError::NotMessagePack { .. }) | Err(EnvelopeError::WrongShape { .. })
        ));
    }

    #[test]
    fn test_wrong_arity_fails() {
        let tuple = MpValue::Array(vec![MpValue::Nil]);
        let mut encoded = Vec::new();
        rmpv::encode::write_value(&mut encoded, &tuple).unwrap();
        assert!(matches!(
            decode_envelope(&encoded),
            Err(EnvelopeError::WrongShape { .. })
        ));
    }

    #[test]
    fn test_bad_identifier_fails() {
        let tuple = MpValue::Array(vec![MpValue::from("not-an-id"), MpValue::Binary(vec![1])]);
        let mut encoded = Vec::new();
        rmpv::encode::write_value(&mut encoded, &tuple).unwrap();
        assert!(matches!(
            decode_envelope(&encoded),
            Err(EnvelopeError::BadIdentifier { .. })
        ));
    }
}
