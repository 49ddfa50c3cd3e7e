//! Pawnwatch Listener
//!
//! Watches a pawn shop contract over WebSocket and forwards its events to
//! the pawn backend.

mod config;
mod shutdown;

use alloy::providers::{Provider, ProviderBuilder, WsConnect};
use clap::Parser;
use config::{ConfigLoader, Overrides};
use pawnwatch_core::contracts::PawningShop;
use pawnwatch_core::processors::{EventDispatcher, PawnEventHandler};
use pawnwatch_core::source;
use shutdown::spawn_shutdown_handler;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Pawnwatch - pawn shop contract event listener
#[derive(Parser, Debug)]
#[command(name = "pawnwatch-listener")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./pawnwatch.toml")]
    config: PathBuf,

    /// Override the node WebSocket endpoint
    #[arg(long, env = "NETWORK_ADDRESS")]
    endpoint: Option<String>,

    /// Override the pawn shop contract address
    #[arg(long, env = "CONTRACT_ADDRESS")]
    contract: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, default_value = "false")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing
    init_tracing(args.log_json);

    tracing::info!("Starting pawnwatch-listener v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(
        &args.config,
        Overrides {
            endpoint: args.endpoint,
            contract_address: args.contract,
        },
    );
    let config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let backend = config.backend.build_client()?;

    // Connect to the node
    let endpoint = config.network.endpoint.clone();
    tracing::info!(endpoint = %endpoint, "Connecting to node...");
    let provider = ProviderBuilder::new()
        .connect_ws(WsConnect::new(endpoint.as_str()))
        .await
        .map_err(|e| {
            tracing::error!(endpoint = %endpoint, "Failed to connect to node: {}", e);
            e
        })?
        .erased();
    let block = provider.get_block_number().await?;
    tracing::info!(block, "Node connection established");

    let contract = config.network.contract_address;
    let shop = PawningShop::new(contract, provider.clone());
    let (feeds, source_handle) = source::subscribe(&provider, contract).await.map_err(|e| {
        tracing::error!("Failed to subscribe to contract events: {}", e);
        e
    })?;

    let shutdown_rx = spawn_shutdown_handler()?;

    let handler = PawnEventHandler::new(backend, shop);
    let result = EventDispatcher::new(handler, feeds, shutdown_rx).run().await;

    // Stop the forwarding tasks
    drop(source_handle);

    match &result {
        Ok(()) => tracing::info!("Listener shutdown complete"),
        Err(e) => tracing::error!(error = %e, "Listener stopped"),
    }
    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,alloy=warn,hyper=warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
