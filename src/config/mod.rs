// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Gateway process configuration
//!
//! Every setting can come from a flag or an environment variable; flags win.
//! Only the port is needed in practice (`GATEWAY_PORT`, default 8080).
//! `GOMLX_PORT` is still honoured when `GATEWAY_PORT` is unset.

use crate::backend::{LocalBackendConfig, DEFAULT_EMBEDDING_DIMENSION};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Parser, Debug, Clone)]
#[command(name = "model-gateway")]
#[command(about = "HTTP gateway for embedding and model optimization", long_about = None)]
pub struct GatewayArgs {
    /// Port to listen on [default: 8080]
    #[arg(long, env = "GATEWAY_PORT")]
    pub port: Option<u16>,

    /// Port variable read by older deployments; `GATEWAY_PORT` wins
    #[arg(long = "legacy-port", env = "GOMLX_PORT", hide = true)]
    pub legacy_port: Option<u16>,

    /// Interface to bind (IP literal or host name)
    #[arg(long, env = "GATEWAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Maximum wait for the model resource, in milliseconds (unset waits forever)
    #[arg(long, env = "GATEWAY_LOCK_TIMEOUT_MS")]
    pub lock_timeout_ms: Option<u64>,

    /// Model to load into the shared resource at startup
    #[arg(long, env = "GATEWAY_MODEL_PATH")]
    pub model_path: Option<String>,

    /// Embedding width produced by the built-in backend
    #[arg(long, env = "EMBEDDING_DIMENSION", default_value_t = DEFAULT_EMBEDDING_DIMENSION)]
    pub dimension: usize,
}

impl GatewayArgs {
    /// `--port`/`GATEWAY_PORT`, then `GOMLX_PORT`, then 8080
    pub fn resolved_port(&self) -> u16 {
        self.port.or(self.legacy_port).unwrap_or(DEFAULT_PORT)
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listen_addr: SocketAddr,
    pub lock_timeout: Option<Duration>,
    pub initial_model: Option<String>,
    pub backend: LocalBackendConfig,
}

impl GatewayConfig {
    pub fn from_args(args: GatewayArgs) -> Result<Self> {
        let listen_addr = resolve_listen_addr(&args.host, args.resolved_port())?;

        Ok(Self {
            listen_addr,
            lock_timeout: args.lock_timeout_ms.map(Duration::from_millis),
            initial_model: args.model_path.filter(|path| !path.trim().is_empty()),
            backend: LocalBackendConfig {
                dimension: args.dimension,
                normalize: true,
            },
        })
    }
}

/// Turns a host (IPv4/IPv6 literal, bracketed or not, or a name) and port
/// into a bindable address. Names are resolved; the first address wins.
pub fn resolve_listen_addr(host: &str, port: u16) -> Result<SocketAddr> {
    let host = host.trim();
    let literal = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    if let Ok(ip) = literal.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    (literal, port)
        .to_socket_addrs()
        .with_context(|| format!("Invalid listen host {}", host))?
        .next()
        .ok_or_else(|| anyhow!("Listen host {} resolved to no addresses", host))
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            lock_timeout: None,
            initial_model: None,
            backend: LocalBackendConfig::default(),
        }
    }
}
