//! # Switchyard Actor Registry
//!
//! ## Purpose
//!
//! This crate contains the command address model and the registry that maps
//! addresses to invocable commands:
//! - `CommandAddress`: parsed `namespace.actor.command` addresses
//! - `CommandMetadata` / `BoundCommand`: per-command description and binding
//! - `ActorInstance`: the closed invocation interface actors implement
//! - `ActorRegistry`: registration, namespace-fallback resolution, listing
//! - `ActorSourceLoader`: discovery of registration records from a location
//!
//! ## Architecture Role
//!
//! The registry is the leaf component of the dispatch path: populated at
//! startup (or during administrative windows), then read-mostly for the
//! server's lifetime. Connection handlers resolve against it and cache the
//! bound results locally, so the hot path takes the registry lock once per
//! distinct address per connection.
//!
//! ## What This Crate Does NOT Contain
//! - Wire framing or argument decoding (libs/codec, services/rpc)
//! - Schema byte⇄struct conversion (libs/schema)

pub mod actor;
pub mod address;
pub mod command;
pub mod error;
pub mod loader;
pub mod store;

pub use actor::{ActorInstance, ActorSource, CallArgs, KeywordArgs};
pub use address::CommandAddress;
pub use command::{BoundCommand, CommandMetadata};
pub use error::{RegistryError, RegistryResult};
pub use loader::{ActorSourceLoader, StaticSourceLoader};
pub use store::{ActorRegistry, ActorSummary, CommandSummary};
