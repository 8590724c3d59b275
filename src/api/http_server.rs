// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use super::embed::embed_handler;
use super::handlers::{health_handler, method_not_allowed};
use super::optimize::optimize_handler;
use crate::backend::ModelBackend;
use crate::coordinator::ModelCoordinator;

pub struct AppState<B: ModelBackend> {
    pub coordinator: Arc<ModelCoordinator<B>>,
    pub started_at: Instant,
}

// Manual impl: derive would require `B: Clone`
impl<B: ModelBackend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
            started_at: self.started_at,
        }
    }
}

impl<B: ModelBackend> AppState<B> {
    pub fn new(coordinator: Arc<ModelCoordinator<B>>) -> Self {
        Self {
            coordinator,
            started_at: Instant::now(),
        }
    }
}

pub fn create_app<B: ModelBackend>(state: AppState<B>) -> Router {
    Router::new()
        .route("/health", get(health_handler::<B>))
        .route("/embed", post(embed_handler::<B>).fallback(method_not_allowed))
        .route("/optimize", post(optimize_handler::<B>).fallback(method_not_allowed))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Running HTTP gateway bound to a local address
pub struct GatewayServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl GatewayServer {
    /// Binds `listen_addr` and serves the gateway in a background task.
    ///
    /// Use port 0 to let the OS pick a free port; [`GatewayServer::local_addr`]
    /// reports the bound address.
    pub async fn start<B: ModelBackend>(
        state: AppState<B>,
        listen_addr: SocketAddr,
    ) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind(listen_addr).await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = create_app(state);
        let handle = tokio::spawn(async move {
            let serve_future = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });

            if let Err(e) = serve_future.await {
                error!("HTTP server error: {}", e);
            }
        });

        info!("Model gateway listening on {}", addr);

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting connections and waits for in-flight requests to finish
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.handle.await {
            error!("HTTP server task failed: {}", e);
        }
    }
}
