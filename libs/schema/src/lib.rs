//! # Switchyard Schema Engine Boundary
//!
//! ## Purpose
//!
//! The dispatch core treats the schema/type-definition system as an opaque
//! capability: given a schema identifier, decode bytes into a structured
//! value and encode a structured value into bytes. This crate defines that
//! boundary as a narrow trait and ships one in-memory adapter.
//!
//! ## Architecture Role
//!
//! ```text
//! services/rpc ──uses──▶ SchemaEngine (trait)
//!                             ▲
//!                             │ implements
//!                     MemorySchemaEngine
//! ```
//!
//! The concrete schema representation is an implementation detail behind the
//! trait; swapping in a real type-definition system touches nothing else.

pub mod engine;
pub mod error;
pub mod memory;

pub use engine::{SchemaEncoding, SchemaEngine};
pub use error::{SchemaError, SchemaResult};
pub use memory::MemorySchemaEngine;
