//! # Switchyard Shared Types
//!
//! ## Purpose
//!
//! This crate contains the pure data structures shared across the Switchyard
//! stack:
//! - `Value`: the native result model the wire codec knows how to frame
//! - `SchemaObject`: a schema-typed structured value with an optional identifier
//! - `SchemaId`: stable identifier/URL of an external schema definition
//! - `ContentType` / `ResponseType`: negotiated wire encodings
//! - Namespace and reserved-name constants
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → libs/codec     → services/rpc
//!     ↑        libs/schema         ↓
//! Pure Data    libs/registry   Dispatch
//! Structures                   Connections
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Wire framing logic (belongs in libs/codec)
//! - Schema byte⇄struct conversion (belongs in libs/schema)
//! - Actor registration or lookup (belongs in libs/registry)

pub mod constants;
pub mod format;
pub mod value;

pub use constants::{
    ACTOR_KEY_SEPARATOR, NAMESPACE_DEFAULT, NAMESPACE_SYSTEM, RESERVED_SCHEMA_OUT,
};
pub use format::{ContentType, FormatError, ResponseType};
pub use value::{SchemaId, SchemaObject, Value};
