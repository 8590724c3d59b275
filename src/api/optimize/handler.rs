// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::api::http_server::AppState;
use crate::api::optimize::{OptimizeRequest, OptimizeResponse};
use crate::api::ApiError;
use crate::backend::{ModelBackend, OperationContext};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use tracing::info;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// POST /optimize handler
///
/// Uses the caller's `x-request-id` when it is a valid UUID so pipeline logs
/// can be correlated with the client; otherwise a fresh id is generated.
pub async fn optimize_handler<B: ModelBackend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
    payload: Result<Json<OptimizeRequest>, JsonRejection>,
) -> Result<Json<OptimizeResponse>, ApiError> {
    let Json(request) = payload?;

    let ctx = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .map(OperationContext::with_request_id)
        .unwrap_or_default();

    info!(request_id = %ctx.request_id, model_path = %request.model_path, "optimize request");

    let result = state.coordinator.optimize_model(&ctx, request).await?;
    Ok(Json(OptimizeResponse::from(result).with_request_id(ctx.request_id)))
}
