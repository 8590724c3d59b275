// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod backend;
pub mod cli;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod version;

pub use api::{create_app, AppState, GatewayServer};
pub use backend::{LocalBackend, LocalBackendConfig, Metrics, ModelBackend, OperationContext};
pub use client::{ClientError, GatewayClient};
pub use config::{GatewayArgs, GatewayConfig};
pub use coordinator::{
    GatewayError, ModelCoordinator, OptimizeRequest, OptimizeResult, PipelineStage,
};

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // A subscriber may already be installed (tests, embedding binaries)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
