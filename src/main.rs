//! MCP Server Entry Point
//!
//! Parses flags, loads configuration, initializes logging and runs the
//! configured transport. The store connection is closed on the way out.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use mongo_admin_mcp::core::{Cli, Config, McpServer, TransportService, init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Defaults < environment (.env) < flags
    let (config, warnings) = Config::load(&cli);

    if let Some(path) = init_logging(&config.logging)? {
        info!("Writing logs to {}", path.display());
    }
    for warning in &warnings {
        warn!("{}", warning);
    }

    info!("Starting {} v{}", config.server.name, config.server.version);
    info!(
        "Database {} at {}{}",
        config.database.name,
        config.database.redacted_uri(),
        if config.database.read_only {
            " (read-only)"
        } else {
            ""
        }
    );

    let server = McpServer::new(config.clone())?;
    info!("Server initialized");

    let transport = TransportService::new(config.transport);
    let outcome = tokio::select! {
        outcome = transport.run(server.clone()) => outcome,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C");
            Ok(())
        }
    };

    server.shutdown().await;

    if let Err(e) = &outcome {
        error!("Transport failed: {}", e);
    }
    outcome?;

    info!("Server shut down");
    Ok(())
}
