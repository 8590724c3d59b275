// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /health tests
//!
//! Health is a liveness check: it must answer even while an optimization
//! holds exclusive access to the model resource.

use crate::common::{app_state, empty_request, send, StubBackend};
use axum::http::{Method, StatusCode};
use model_gateway::api::http_server::create_app;
use std::time::Duration;

#[tokio::test]
async fn test_health_reports_ok() {
    let (state, _) = app_state(StubBackend::default());
    let app = create_app(state);

    let (status, body) = send(app, empty_request(Method::GET, "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "model-gateway");
    assert_eq!(body["backend"], "stub");
    assert_eq!(body["resource"], "available");
    assert_eq!(body["model_revision"], 0);
    assert!(body.get("model_updated_at").is_none(), "no model installed yet");
}

#[tokio::test]
async fn test_health_answers_while_write_lock_held() {
    let (state, _) = app_state(StubBackend::default());
    let coordinator = state.coordinator.clone();
    let app = create_app(state);

    let guard = coordinator.resource().write().await.unwrap();

    let (status, body) = tokio::time::timeout(
        Duration::from_secs(1),
        send(app, empty_request(Method::GET, "/health")),
    )
    .await
    .expect("health must not wait on the model resource");

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["resource"], "busy");
    assert!(body.get("model_revision").is_none());
    assert!(body.get("model_updated_at").is_none());

    drop(guard);
}

#[tokio::test]
async fn test_health_tracks_revision_after_optimize() {
    let (state, _) = app_state(StubBackend::default());
    let coordinator = state.coordinator.clone();

    coordinator
        .optimize_model(&Default::default(), model_gateway::OptimizeRequest::new("m"))
        .await
        .unwrap();

    let (status, body) = send(create_app(state), empty_request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_revision"], 1);

    let updated_at = body["model_updated_at"].as_str().unwrap();
    assert!(updated_at.parse::<chrono::DateTime<chrono::Utc>>().is_ok());
}
