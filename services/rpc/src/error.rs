//! Per-request error taxonomy.
//!
//! Every variant here is caught by the connection loop, written back to the
//! client as an error reply carrying the class name and a readable message,
//! and the loop continues. Protocol faults and peer disconnects are not in
//! this enum; they live in `codec::ProtocolError` and end the connection.

use registry::RegistryError;
use thiserror::Error;
use types::FormatError;

/// Failures scoped to a single request.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Malformed address, unknown actor/command, missing source.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A header declared an encoding the server does not speak.
    #[error("UnsupportedContentType: {0}")]
    UnsupportedContentType(#[from] FormatError),

    /// An argument payload that does not decode under the negotiated mode.
    #[error("InvalidPayload: {detail}")]
    InvalidPayload { detail: String },

    /// A command signature that declares the reserved `schema_out` name.
    #[error(
        "SignatureConflict: 'schema_out' must not appear in the argument signature of command '{command}'"
    )]
    SignatureConflict { command: String },

    /// Failed authentication.
    #[error("PermissionDenied: {detail}")]
    PermissionDenied { detail: String },

    /// Catch-all for failures raised by the invoked callable.
    #[error("ApplicationError: {0:#}")]
    Application(anyhow::Error),
}

impl RpcError {
    /// Create an invalid-payload error.
    pub fn invalid_payload(detail: impl Into<String>) -> Self {
        Self::InvalidPayload {
            detail: detail.into(),
        }
    }

    /// Create a permission-denied error.
    pub fn permission_denied(detail: impl Into<String>) -> Self {
        Self::PermissionDenied {
            detail: detail.into(),
        }
    }
}

/// Result type for request dispatch.
pub type RpcResult<T> = std::result::Result<T, RpcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_replies_carry_class_names() {
        let err = RpcError::from(RegistryError::command_not_found("cannot find actor"));
        assert!(err.to_string().starts_with("CommandNotFound:"));

        let err = RpcError::invalid_payload("bad envelope");
        assert!(err.to_string().starts_with("InvalidPayload:"));

        let err = RpcError::permission_denied("who are you");
        assert!(err.to_string().starts_with("PermissionDenied:"));
    }
}
