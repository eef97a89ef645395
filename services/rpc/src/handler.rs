//! Per-connection dispatch engine.
//!
//! One handler drives one connection end-to-end: `OPEN → (receive →
//! dispatch → reply)* → CLOSED`. Nothing persists across frames except the
//! session and the local resolution cache, and the loop is strictly
//! sequential, so neither needs locking.

use crate::argcodec;
use crate::auth::IdentityVerifier;
use crate::error::{RpcError, RpcResult};
use crate::request::Request;
use crate::session::Session;
use bytes::Bytes;
use codec::RespCodec;
use registry::{ActorRegistry, BoundCommand, CallArgs, CommandAddress};
use schema::SchemaEngine;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use types::{Value, NAMESPACE_SYSTEM};

/// Built-in commands intercepted before registry resolution.
const BUILTIN_HEALTH: &str = "command";
const BUILTIN_PING: &str = "ping";
const BUILTIN_AUTH: &str = "auth";

/// Drives one connection's request loop.
pub struct ConnectionHandler {
    registry: Arc<ActorRegistry>,
    engine: Arc<dyn SchemaEngine>,
    verifier: Arc<dyn IdentityVerifier>,
    default_namespace: String,
    session: Session,
    /// Local index from resolved triple to bound command. Populated lazily,
    /// never invalidated while the server runs (the registry is read-mostly).
    resolved: HashMap<(String, String, String), Arc<BoundCommand>>,
}

impl ConnectionHandler {
    pub fn new(
        registry: Arc<ActorRegistry>,
        engine: Arc<dyn SchemaEngine>,
        verifier: Arc<dyn IdentityVerifier>,
        default_namespace: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            engine,
            verifier,
            default_namespace: default_namespace.into(),
            session: Session::new(),
            resolved: HashMap::new(),
        }
    }

    /// Run the request loop until the peer goes away, a protocol fault
    /// occurs, a teardown frame arrives, or shutdown is requested.
    ///
    /// The codec is closed on every exit path.
    pub async fn run<S>(mut self, mut codec: RespCodec<S>, peer: String, cancel: CancellationToken)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        info!(peer = %peer, "new incoming connection");

        loop {
            // Cancellation is observed between requests only: an in-flight
            // dispatch always finishes and replies before the loop exits.
            let frame = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(peer = %peer, "shutdown requested, closing connection");
                    break;
                }
                frame = codec.read_frame() => frame,
            };

            match frame {
                Ok(Some(fields)) => match self.handle_request(fields).await {
                    Ok(value) => {
                        if let Err(e) = codec.write_value(&value).await {
                            warn!(peer = %peer, error = %e, "failed to write reply");
                            break;
                        }
                    }
                    Err(err) => {
                        debug!(peer = %peer, error = %err, "request failed");
                        if let Err(e) = codec.write_error(&err.to_string()).await {
                            warn!(peer = %peer, error = %e, "failed to write error reply");
                            break;
                        }
                    }
                },
                Ok(None) => {
                    debug!(peer = %peer, "teardown frame received");
                    break;
                }
                Err(e) if e.is_disconnect() => break,
                Err(e) => {
                    warn!(peer = %peer, error = %e, "protocol error, closing connection");
                    break;
                }
            }
        }

        if let Err(e) = codec.close().await {
            debug!(peer = %peer, error = %e, "error releasing codec");
        }
        info!(peer = %peer, "connection closed");
    }

    /// Dispatch one request to a built-in or a registered command.
    async fn handle_request(&mut self, fields: Vec<Bytes>) -> RpcResult<Value> {
        let request = Request::parse(fields)?;
        let address = CommandAddress::parse(request.address(), &self.default_namespace)?;

        debug!(
            namespace = %address.namespace,
            actor = %address.actor,
            command = %address.command,
            "request received"
        );

        if address.namespace == NAMESPACE_SYSTEM && address.actor == NAMESPACE_SYSTEM {
            match address.command.as_str() {
                BUILTIN_HEALTH => return Ok(Value::from("OK")),
                BUILTIN_PING => return Ok(Value::from("PONG")),
                BUILTIN_AUTH => return self.handle_auth(&request).await,
                _ => {}
            }
        }

        let bound = self.resolve_cached(&address)?;

        let args = match &bound.meta.schema_in {
            Some(schema_in) => {
                let object = argcodec::decode_schema_args(
                    self.engine.as_ref(),
                    schema_in,
                    request.payload()?,
                    request.content_type()?,
                )?;
                CallArgs::Keyword(argcodec::keyword_args(
                    self.engine.as_ref(),
                    &bound.meta,
                    &object,
                )?)
            }
            None => CallArgs::Positional(request.args().to_vec()),
        };

        let result = bound.invoke(args).await.map_err(RpcError::Application)?;

        argcodec::encode_result(
            self.engine.as_ref(),
            &bound.meta,
            request.response_type()?,
            result,
        )
    }

    /// Verify an identity/challenge/signature triple and mark the session.
    async fn handle_auth(&mut self, request: &Request) -> RpcResult<Value> {
        let args = request.args();
        if args.len() < 3 {
            return Err(RpcError::invalid_payload(
                "auth requires identity, challenge and signature arguments",
            ));
        }
        let identity = String::from_utf8_lossy(&args[0]).into_owned();
        let challenge = String::from_utf8_lossy(&args[1]);
        let signature = String::from_utf8_lossy(&args[2]);

        let verified = self
            .verifier
            .verify(&identity, &challenge, &signature)
            .await
            .map_err(RpcError::Application)?;

        if !verified {
            return Err(RpcError::permission_denied(format!(
                "could not authenticate identity '{}'",
                identity
            )));
        }

        info!(identity = %identity, "session authenticated");
        self.session.authenticate(identity);
        Ok(Value::Bool(true))
    }

    /// Resolve through the local cache, hitting the registry on first use.
    fn resolve_cached(&mut self, address: &CommandAddress) -> RpcResult<Arc<BoundCommand>> {
        let triple = address.triple();
        if let Some(bound) = self.resolved.get(&triple) {
            return Ok(bound.clone());
        }

        debug!(address = %address, "command cache miss");
        let bound =
            self.registry
                .resolve(&address.namespace, &address.actor, &address.command)?;
        self.resolved.insert(triple, bound.clone());
        Ok(bound)
    }

    /// The connection's session (read-only outside the auth path).
    pub fn session(&self) -> &Session {
        &self.session
    }
}
