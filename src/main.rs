// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use model_gateway::{
    version, AppState, GatewayArgs, GatewayConfig, GatewayServer, LocalBackend, ModelCoordinator,
};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    model_gateway::init_tracing("info");

    let config = GatewayConfig::from_args(GatewayArgs::parse())?;
    info!("🚀 Starting {}", version::get_version_string());
    info!("Features: {}", version::FEATURES.join(", "));

    let backend = LocalBackend::new(config.backend.clone())?;
    let coordinator = Arc::new(ModelCoordinator::new(backend, config.lock_timeout));

    match coordinator.resource().lock_timeout() {
        Some(limit) => info!("Model resource wait bounded to {}ms", limit.as_millis()),
        None => info!("Model resource wait is unbounded"),
    }

    if let Some(model_path) = &config.initial_model {
        match coordinator.preload(model_path).await {
            Ok(revision) => info!("✅ Preloaded {} (revision {})", model_path, revision),
            Err(e) => warn!("⚠️ Failed to preload {}: {}", model_path, e),
        }
    }

    let server = GatewayServer::start(AppState::new(coordinator), config.listen_addr).await?;
    let addr = server.local_addr();

    info!("API Endpoints:");
    info!("  Health:   GET  http://{}/health", addr);
    info!("  Embed:    POST http://{}/embed", addr);
    info!("  Optimize: POST http://{}/optimize", addr);

    signal::ctrl_c().await?;
    info!("⏹️  Shutting down...");
    server.shutdown().await;

    Ok(())
}
