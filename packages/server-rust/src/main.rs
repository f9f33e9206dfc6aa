//! Stackcalc server binary.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stackcalc_server::{NetworkConfig, NetworkModule};

/// HTTP calculator server with a shared stack and a history ledger.
#[derive(Debug, Parser)]
#[command(name = "stackcalc-server", version)]
struct ServerArgs {
    /// Bind address for the server.
    #[arg(long, env = "STACKCALC_HOST", default_value = "0.0.0.0")]
    host: String,
    /// Port to listen on.
    #[arg(long, env = "STACKCALC_PORT", default_value_t = 8496)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stackcalc_server=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut module = NetworkModule::new(NetworkConfig {
        host: args.host,
        port: args.port,
    });
    let port = module.start().await?;
    info!(port, "stackcalc server ready");

    module.serve(shutdown_signal()).await
}

/// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for the shutdown signal: {error}");
    }
}
