//! Registry and address-resolution errors.
//!
//! Everything here is a per-request condition: the connection handler reports
//! it to the client as an error reply and keeps the connection open.

use thiserror::Error;

/// Address parsing and command resolution failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Dotted address with a segment count outside {1, 2, 3}.
    #[error("MalformedAddress: '{input}' is not properly formatted (expected 1-3 dotted segments)")]
    MalformedAddress { input: String },

    /// No actor (after fallback) or no such command on the actor.
    #[error("CommandNotFound: {detail}")]
    CommandNotFound { detail: String },

    /// An actor source location that does not exist or yields nothing.
    #[error("SourceNotFound: {location}")]
    SourceNotFound { location: String },
}

impl RegistryError {
    /// Create a malformed-address error.
    pub fn malformed_address(input: impl Into<String>) -> Self {
        Self::MalformedAddress {
            input: input.into(),
        }
    }

    /// Create a command-not-found error.
    pub fn command_not_found(detail: impl Into<String>) -> Self {
        Self::CommandNotFound {
            detail: detail.into(),
        }
    }

    /// Create a source-not-found error.
    pub fn source_not_found(location: impl Into<String>) -> Self {
        Self::SourceNotFound {
            location: location.into(),
        }
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
