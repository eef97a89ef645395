//! The narrow interface the dispatch core consumes.

use crate::error::SchemaResult;
use bytes::Bytes;
use types::{SchemaId, SchemaObject};

/// Target encodings for [`SchemaEngine::encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaEncoding {
    /// Structural binary form, the default reply encoding.
    Binary,
    /// Schema-native binary form (`msgpack` response type).
    Msgpack,
    /// Text form (`json` response type).
    Json,
}

/// Byte⇄struct conversion for schema-typed values.
///
/// Implementations must be cheap to share across connection tasks; all
/// methods take `&self` and the engine is held behind an `Arc`.
pub trait SchemaEngine: Send + Sync {
    /// Decode the binary (envelope) form of a value.
    fn decode(&self, schema: &SchemaId, data: &[u8]) -> SchemaResult<SchemaObject>;

    /// Construct a value from an already-parsed JSON document.
    fn decode_json(&self, schema: &SchemaId, doc: &serde_json::Value) -> SchemaResult<SchemaObject>;

    /// Encode a value into the requested wire encoding.
    fn encode(&self, object: &SchemaObject, encoding: SchemaEncoding) -> SchemaResult<Bytes>;

    /// Declared property names of a schema, in declaration order.
    ///
    /// Drives keyword-argument construction: the dispatch layer reads decoded
    /// values property-by-property in exactly this order.
    fn property_names(&self, schema: &SchemaId) -> SchemaResult<Vec<String>>;
}
