// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::api::embed::{EmbedRequest, EmbedResponse};
use crate::api::http_server::AppState;
use crate::api::ApiError;
use crate::backend::ModelBackend;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::debug;

/// POST /embed handler
///
/// A body that fails to parse is rejected with 400 before the coordinator is
/// touched. Backend failures surface as 500, lock timeouts as 503.
pub async fn embed_handler<B: ModelBackend>(
    State(state): State<AppState<B>>,
    payload: Result<Json<EmbedRequest>, JsonRejection>,
) -> Result<Json<EmbedResponse>, ApiError> {
    let Json(request) = payload?;
    debug!(chars = request.text.len(), "embed request");

    let embedding = state.coordinator.generate_embedding(&request.text).await?;
    Ok(Json(EmbedResponse::from(embedding)))
}
