// ABOUTME: Server binary for the LexDraft legal drafting assistant API
// ABOUTME: Loads environment configuration, wires resources, and serves HTTP until interrupted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # LexDraft Server Binary
//!
//! Starts the HTTP API with the configured conversation store and Gemini backend.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lexdraft_server::{
    config::{DatabaseUrl, ServerConfig},
    logging,
    resources::ServerResources,
    routes,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "lexdraft-server")]
#[command(about = "LexDraft - conversation-grounded legal drafting assistant API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// Override `DATABASE_URL` (`sqlite:<path>`, `sqlite::memory:`, or `memory`)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if let Some(url) = args.database_url.as_deref() {
        config.database = DatabaseUrl::parse_url(url)?;
    }

    logging::init_from_env()?;
    info!("{}", config.summary());

    let resources = Arc::new(ServerResources::from_config(&config).await?);
    let app = routes::router(resources);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("LexDraft listening on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("LexDraft stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received");
}
