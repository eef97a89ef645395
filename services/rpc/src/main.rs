//! Switchyard RPC server binary.
//!
//! Usage:
//!   switchyard-rpc
//!   switchyard-rpc --config config/switchyard.toml
//!   switchyard-rpc --log-level debug --json-logs

use anyhow::Result;
use clap::Parser;
use schema::MemorySchemaEngine;
use std::path::PathBuf;
use std::sync::Arc;
use switchyard_rpc::{register_system_actor, KeyedHashVerifier, RpcServer, ServerConfig};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "switchyard-rpc")]
#[command(about = "Switchyard actor RPC server")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    info!("starting Switchyard RPC server");

    let config = ServerConfig::load(args.config.as_deref()).map_err(|e| {
        error!("failed to load configuration: {}", e);
        e
    })?;
    info!(name = %config.name, addr = %config.address(), "loaded configuration");

    let registry = Arc::new(registry::ActorRegistry::new());
    register_system_actor(&registry);

    let engine = Arc::new(MemorySchemaEngine::new());
    let verifier = Arc::new(KeyedHashVerifier::new(config.auth.clone()));

    let server = RpcServer::bind(config, registry, engine, verifier).await?;
    let handle = server.handle();

    tokio::spawn(async move {
        wait_for_signal().await;
        info!("received shutdown signal");
        handle.shutdown();
    });

    server.run().await
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));

    if args.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
