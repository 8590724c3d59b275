// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! HTTP client for the gateway
//!
//! Thin typed wrapper over the three endpoints. Each call carries its own
//! timeout: health checks are short, optimizations get the longest budget.

use crate::api::{EmbedRequest, EmbedResponse, ErrorResponse, OptimizeRequest, OptimizeResponse};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway answered with a non-success status
    #[error("gateway returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Gateway answered 200 but reported `success: false`
    #[error("gateway rejected request: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub health_timeout: Duration,
    pub embed_timeout: Duration,
    pub optimize_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            health_timeout: Duration::from_secs(5),
            embed_timeout: Duration::from_secs(10),
            optimize_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(ClientConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    pub fn with_config(mut config: ClientConfig) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Returns true when `GET /health` answers 200. Never errors.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);
        match self
            .http
            .get(&url)
            .timeout(self.config.health_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Gateway health check failed: {}", e);
                false
            }
        }
    }

    pub async fn generate_embedding(&self, text: &str) -> Result<Vec<f64>> {
        let response: EmbedResponse = self
            .post_json("/embed", &EmbedRequest::new(text), self.config.embed_timeout)
            .await?;

        if !response.success {
            return Err(ClientError::Rejected("embedding not generated".to_string()));
        }
        Ok(response.embedding)
    }

    pub async fn optimize_model(&self, request: &OptimizeRequest) -> Result<OptimizeResponse> {
        let response: OptimizeResponse = self
            .post_json("/optimize", request, self.config.optimize_timeout)
            .await?;

        if !response.success {
            return Err(ClientError::Rejected(response.message));
        }
        Ok(response)
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req, timeout: Duration) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .http
            .post(&url)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Resp>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.error)
            .unwrap_or(text);

        error!("Gateway {} failed with {}: {}", path, status, message);
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }
}
