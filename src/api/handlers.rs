// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::api::http_server::AppState;
use crate::api::ApiError;
use crate::backend::ModelBackend;
use crate::coordinator::{GatewayError, ResourceState};
use axum::{
    extract::State,
    http::{Method, Uri},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub backend: String,
    /// Whether the model resource could be read right now
    pub resource: ResourceState,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub model_revision: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub model_updated_at: Option<DateTime<Utc>>,
    pub uptime_secs: u64,
}

/// GET /health
///
/// Liveness only. Reads the resource without waiting, so it answers
/// immediately even while an optimization holds the write lock.
pub async fn health_handler<B: ModelBackend>(
    State(state): State<AppState<B>>,
) -> Json<HealthResponse> {
    let status = state.coordinator.status();

    Json(HealthResponse {
        status: "ok".to_string(),
        service: crate::version::SERVICE_NAME.to_string(),
        version: crate::version::VERSION.to_string(),
        backend: state.coordinator.backend().name().to_string(),
        resource: status.resource,
        model_revision: status.revision,
        model_updated_at: status.updated_at,
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// Fallback for unsupported verbs on the mutating routes
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError(GatewayError::MethodNotAllowed(format!(
        "{} {} (use POST)",
        method,
        uri.path()
    )))
}
