//! Schema engine errors.

use thiserror::Error;
use types::SchemaId;

/// Failures at the schema boundary.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The engine has no definition for the requested identifier.
    #[error("unknown schema '{schema}'")]
    UnknownSchema { schema: SchemaId },

    /// Bytes that do not decode under the schema.
    #[error("cannot decode data for schema '{schema}': {detail}")]
    Decode { schema: SchemaId, detail: String },

    /// A value the schema cannot represent in the requested encoding.
    #[error("cannot encode value for schema '{schema}': {detail}")]
    Encode { schema: SchemaId, detail: String },
}

impl SchemaError {
    /// Create a decode error.
    pub fn decode(schema: &SchemaId, detail: impl Into<String>) -> Self {
        Self::Decode {
            schema: schema.clone(),
            detail: detail.into(),
        }
    }

    /// Create an encode error.
    pub fn encode(schema: &SchemaId, detail: impl Into<String>) -> Self {
        Self::Encode {
            schema: schema.clone(),
            detail: detail.into(),
        }
    }
}

/// Result type for schema operations.
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;
