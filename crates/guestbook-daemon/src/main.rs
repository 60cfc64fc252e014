// crates/guestbook-daemon/src/main.rs
//
// Binary entrypoint for the Guestbook daemon.
//
// Initializes tracing, parses CLI arguments, loads configuration, opens the
// configured entry store, and serves the RPC API until Ctrl-C.

mod backend;
mod config;

use std::sync::Arc;

use clap::Parser;
use config::DaemonConfig;

use guestbook_rpc::{GuestbookRouter, GuestbookRpcServer, RpcConfig, StaticTokenAuthenticator};

/// Guestbook daemon: serves the guestbook RPC API.
#[derive(Parser, Debug)]
#[command(name = "guestbookd", version, about = "Guestbook RPC daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.guestbook/config.toml")]
    config: String,

    /// Override the RPC port from the config file.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config_path = backend::expand_tilde(&args.config);

    // Load before tracing is up so `log_level` can seed the filter; report
    // the outcome once the subscriber exists.
    let loaded = DaemonConfig::load(&config_path);
    let mut daemon_config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => DaemonConfig::default(),
    };

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&daemon_config.log_level)),
        )
        .init();

    match loaded {
        Ok(_) => tracing::info!("Loaded configuration from {}", config_path),
        Err(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            config_path,
            e
        ),
    }

    // CLI --port flag overrides the config file value.
    if let Some(port) = args.port {
        daemon_config.rpc_port = port;
    }

    tracing::info!("Guestbook Daemon v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Storage backend: {:?}", daemon_config.storage_backend);
    tracing::info!("Data directory: {}", daemon_config.data_dir);
    tracing::info!(
        "RPC endpoint: {}:{}",
        daemon_config.rpc_host,
        daemon_config.rpc_port
    );
    tracing::info!("Store failure policy: {:?}", daemon_config.store_failure_policy);

    let data_dir = backend::expand_tilde(&daemon_config.data_dir);
    let store = backend::open_store(daemon_config.storage_backend, &data_dir)?;

    let authenticator = StaticTokenAuthenticator::new(
        daemon_config
            .auth_tokens
            .iter()
            .map(|t| (t.subject.clone(), t.token_sha256.clone())),
    );
    if authenticator.is_empty() {
        tracing::warn!("No auth tokens configured; guestbook/submitEntry will reject every caller");
    } else {
        tracing::info!("{} auth token(s) configured", authenticator.len());
    }

    let router = GuestbookRouter::new(store)
        .with_store_failure_policy(daemon_config.store_failure_policy);
    let rpc_config = RpcConfig {
        host: daemon_config.rpc_host.clone(),
        port: daemon_config.rpc_port,
    };
    let rpc_server = GuestbookRpcServer::new(rpc_config, router, Arc::new(authenticator));

    rpc_server
        .start_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("Guestbook daemon shut down gracefully");
    Ok(())
}
