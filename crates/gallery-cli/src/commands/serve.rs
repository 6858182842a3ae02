//! Serve command - starts the API server.

use anyhow::{Context, Result};
use colored::Colorize;
use std::net::SocketAddr;
use std::time::Duration;

use gallery_api::{ApiServer, ApiServerConfig, AppState};
use gallery_core::db::{run_migrations, run_warehouse_migrations};

use super::database::connect;
use crate::config::AppConfig;

/// Runs the API server until it is signalled to stop.
pub async fn run_server(config: AppConfig) -> Result<()> {
    println!("{} Starting gallery API server...", "[server]".cyan());

    let (oltp, warehouse) = connect(&config).await?;

    println!("  {} Running migrations...", "→".green());
    run_migrations(&oltp)
        .await
        .context("Failed to run operational migrations")?;
    run_warehouse_migrations(&warehouse)
        .await
        .context("Failed to run warehouse migrations")?;
    println!("  {} Migrations complete", "✓".green());

    let state = AppState::new(oltp, warehouse);

    let bind_address: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid bind address")?;

    let server_config = ApiServerConfig {
        bind_address,
        request_timeout: Duration::from_secs(config.server.request_timeout_secs),
        cors_origins: config.server.cors_origins.clone(),
    };

    println!();
    println!("{}", "Gallery API Server".bold());
    println!("{}", "═".repeat(40));
    println!("  {} http://{}", "Address:".cyan(), bind_address);
    if config.server.cors_origins.is_empty() {
        println!("  {} any", "CORS:".cyan());
    } else {
        println!("  {} {}", "CORS:".cyan(), config.server.cors_origins.join(", "));
    }

    println!();
    println!("{}", "Endpoints:".bold());
    println!("  GET  /health                  - Health check");
    println!("  GET  /api/artworks            - Collection (also exhibitions, visitors, staff,");
    println!("                                  loans, insurances, restorations)");
    println!("  GET  /api/statistics          - Dashboard counters");
    println!("  GET  /api/reports/...         - Warehouse reports");
    println!("  POST /api/etl/sync            - Refresh the warehouse");
    println!();
    println!("Press {} to stop", "Ctrl+C".yellow());
    println!();

    let server = ApiServer::new(state, server_config);
    server.run().await.context("Server error")?;

    println!();
    println!("{} Server stopped", "[server]".cyan());

    Ok(())
}
