//! # Switchyard RPC Service
//!
//! ## Purpose
//!
//! The runnable core of Switchyard: accepts connections, frames requests,
//! resolves command addresses against the actor registry, marshals
//! schema-typed arguments and results, and drives the per-connection
//! dispatch loop with defined error semantics.
//!
//! ## Request Flow
//!
//! ```text
//! Listener ──accept──▶ ConnectionHandler ──▶ RespCodec (frame)
//!                            │
//!                            ▼
//!                     CommandAddress ──▶ ActorRegistry (cached resolve)
//!                            │
//!                            ▼
//!                     argument decode ──▶ invoke ──▶ result encode ──▶ reply
//! ```
//!
//! Per-request failures become error replies and the connection stays
//! usable; protocol faults and peer disconnects end the connection loop.

pub mod argcodec;
pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod request;
pub mod server;
pub mod session;
pub mod system_actor;

pub use auth::{IdentityVerifier, KeyedHashVerifier};
pub use config::ServerConfig;
pub use error::{RpcError, RpcResult};
pub use handler::ConnectionHandler;
pub use server::{RpcServer, ServerHandle};
pub use session::Session;
pub use system_actor::register_system_actor;
