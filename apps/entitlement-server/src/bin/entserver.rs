//! Sample entitlement oracle.
//!
//! Answers `Entitlement/Entitled` from the reader/writer lists of a YAML file:
//!
//! ```text
//! entserver --grpc-port 21001 --config-file entserver-sample.yml --log-level debug
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use entitlement_server::logging::{self, LogLevel};
use entitlement_server::{config, oracle};
use static_entitlement_plugin::Service;
use tokio::net::TcpListener;

#[derive(Debug, Parser)]
#[command(name = "entserver", about = "Sample entitlement oracle", version)]
struct Cli {
    /// gRPC listen port
    #[arg(long, default_value_t = 21001)]
    grpc_port: u16,

    /// Reader/writer lists
    #[arg(long, default_value = "entserver-sample.yml")]
    config_file: PathBuf,

    /// Log verbosity
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level);
    tracing::info!("entserver started");

    let listener = TcpListener::bind(("0.0.0.0", cli.grpc_port))
        .await
        .with_context(|| format!("failed to listen on port {}", cli.grpc_port))?;

    let cfg = config::load(&cli.config_file)?;
    tracing::info!(
        readers = ?cfg.readers,
        writers = ?cfg.writers,
        "Loaded reader/writer lists"
    );

    let oracle = Arc::new(Service::new(&cfg));
    oracle::serve(listener, oracle, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
