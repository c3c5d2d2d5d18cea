// ABOUTME: Server binary for the fitness accountability service
// ABOUTME: Loads configuration, opens the store, and serves the REST API until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Accountability Server Binary
//!
//! Starts the HTTP API with the configured store and photo directory.

use std::env;
#[cfg(not(unix))]
use std::future;
use std::net::SocketAddr;
use std::sync::Arc;

use accountability_server::{
    config::environment::{DatabaseUrl, ServerConfig},
    database_plugins::factory::Database,
    logging,
    resources::ServerResources,
    routes,
};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "accountability-server")]
#[command(about = "Fitness accountability API - daily check-ins, streaks, and coach insights")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override `DATABASE_URL` (e.g. `sqlite:./data/accountability.db` or `memory`)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url.as_deref() {
        config.database =
            DatabaseUrl::parse_url(database_url).context("Invalid --database-url")?;
    }

    info!("Starting Accountability Server");
    info!("{}", config.summary());

    let database = Database::from_url(&config.database).await?;
    info!(
        "Database initialized successfully: {}",
        database.backend_info()
    );

    let config = Arc::new(config);
    let resources = Arc::new(ServerResources::new(database, Arc::clone(&config)));
    let app = routes::router(resources);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    display_available_endpoints(&config);
    info!("Server listening on {addr}");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {e}");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received terminate signal, shutting down"),
    }
}

/// Display all available API endpoints
#[allow(clippy::cognitive_complexity)]
fn display_available_endpoints(config: &ServerConfig) {
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let port = config.http_port;

    info!("=== Available API Endpoints ===");
    info!("Health:");
    info!("   Health Check:      GET    http://{host}:{port}/health");
    info!("Members:");
    info!("   Initialize:        POST   http://{host}:{port}/api/members/init");
    info!("   Reset My Data:     DELETE http://{host}:{port}/api/members/me/data");
    info!("Check-ins:");
    info!("   Today:             GET    http://{host}:{port}/api/checkin");
    info!("   Create:            POST   http://{host}:{port}/api/checkin");
    info!("   History:           GET    http://{host}:{port}/api/checkin/history");
    info!("   Delete:            DELETE http://{host}:{port}/api/checkin/{{id}}");
    info!("   Toggle Visibility: POST   http://{host}:{port}/api/checkin/{{id}}/visibility");
    info!("Photos:");
    info!("   Upload:            POST   http://{host}:{port}/api/photos");
    info!("   Delete:            DELETE http://{host}:{port}/api/photos/{{id}}");
    info!("Community:");
    info!("   Feed:              GET    http://{host}:{port}/api/feed");
    info!("   Daily Stats:       GET    http://{host}:{port}/api/community-stats");
    info!("Coach:");
    info!("   Dashboard:         GET    http://{host}:{port}/api/coach/dashboard");
    info!("   Recompute Stats:   POST   http://{host}:{port}/api/coach/community-stats/recompute");
    info!("=== End of Endpoint List ===");
}
