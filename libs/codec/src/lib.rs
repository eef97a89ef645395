//! # Switchyard Protocol Codec
//!
//! ## Purpose
//!
//! This crate contains the "wire rules" layer of Switchyard:
//! - Multi-bulk frame reading and writing (Redis-style RESP framing)
//! - Typed error replies distinct from data replies
//! - The binary schema-argument envelope (`[id_or_null, schema_data]`)
//! - Protocol error types
//!
//! ## Wire Format
//!
//! A request frame is an array header followed by length-prefixed binary
//! fields, bit-compatible with the RESP protocol family:
//!
//! ```text
//! *<n>\r\n
//! $<len0>\r\n<bytes0>\r\n
//! ...
//! $<lenN>\r\n<bytesN>\r\n
//! ```
//!
//! Field 0 is the dotted command address; field 1 optionally carries the
//! argument payload; field 2 optionally carries a JSON header map. A null
//! (`*-1`) or empty (`*0`) array signals connection teardown.
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → services/rpc
//!     ↑           ↓           ↓
//! Pure Data   Wire Rules   Dispatch
//! Structures  Framing      Connections
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Socket management or connection lifecycle (belongs in services/rpc)
//! - Schema byte⇄struct conversion (belongs in libs/schema)

pub mod envelope;
pub mod error;
pub mod frame;

pub use envelope::{decode_envelope, encode_envelope, Envelope, EnvelopeError};
pub use error::{ProtocolError, ProtocolResult};
pub use frame::{RespCodec, MAX_FRAME_SIZE_DEFAULT};
