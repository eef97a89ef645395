//! Server lifecycle: listen, accept, drain, shutdown.

use crate::auth::IdentityVerifier;
use crate::config::ServerConfig;
use crate::handler::ConnectionHandler;
use anyhow::{Context, Result};
use codec::RespCodec;
use registry::ActorRegistry;
use schema::SchemaEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Cloneable handle used to request shutdown from outside the accept loop.
#[derive(Clone)]
pub struct ServerHandle {
    cancel: CancellationToken,
}

impl ServerHandle {
    /// Request shutdown: stop accepting, let in-flight requests finish,
    /// drain connection tasks. Idempotent; repeated calls are no-ops.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// The listening RPC server.
///
/// One lightweight task per accepted connection, scheduled over a bounded
/// pool: the accept loop takes a pool permit before accepting, so a full
/// pool pushes back on new connections instead of serving them.
pub struct RpcServer {
    config: ServerConfig,
    registry: Arc<ActorRegistry>,
    engine: Arc<dyn SchemaEngine>,
    verifier: Arc<dyn IdentityVerifier>,
    listener: TcpListener,
    cancel: CancellationToken,
}

impl RpcServer {
    /// Bind the listening socket. Failure here is fatal at startup.
    pub async fn bind(
        config: ServerConfig,
        registry: Arc<ActorRegistry>,
        engine: Arc<dyn SchemaEngine>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Result<Self> {
        let listener = TcpListener::bind(config.address())
            .await
            .with_context(|| format!("failed to bind listening port at {}", config.address()))?;

        let addr = listener
            .local_addr()
            .context("listener has no local address")?;
        info!(name = %config.name, addr = %addr, "server listening");

        Ok(Self {
            config,
            registry,
            engine,
            verifier,
            listener,
            cancel: CancellationToken::new(),
        })
    }

    /// Actual bound address (relevant when configured with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("listener has no local address")
    }

    /// Handle for requesting shutdown.
    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// Serve until shutdown is requested, then drain and return.
    pub async fn run(self) -> Result<()> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        let mut connections: JoinSet<()> = JoinSet::new();

        loop {
            // Backpressure: hold a pool slot before accepting.
            let permit = tokio::select! {
                _ = self.cancel.cancelled() => break,
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let (stream, peer) = tokio::select! {
                _ = self.cancel.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!(error = %e, "failed to accept connection");
                        continue;
                    }
                },
            };

            if let Err(e) = stream.set_nodelay(true) {
                warn!(peer = %peer, error = %e, "failed to set TCP_NODELAY");
            }

            let handler = ConnectionHandler::new(
                self.registry.clone(),
                self.engine.clone(),
                self.verifier.clone(),
                self.config.default_namespace.clone(),
            );
            let codec = RespCodec::with_max_frame_size(stream, self.config.max_frame_size);
            let cancel = self.cancel.clone();

            connections.spawn(async move {
                handler.run(codec, peer.to_string(), cancel).await;
                drop(permit);
            });
        }

        // Stop accepting before draining.
        drop(self.listener);
        if !connections.is_empty() {
            info!(tasks = connections.len(), "draining connection tasks");
        }
        while let Some(joined) = connections.join_next().await {
            if let Err(e) = joined {
                debug!(error = %e, "connection task ended abnormally");
            }
        }

        info!(name = %self.config.name, "server stopped");
        Ok(())
    }
}
