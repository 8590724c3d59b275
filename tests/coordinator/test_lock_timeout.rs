// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Bounded waits on the model resource
//!
//! With a lock timeout configured, an operation that cannot get access in
//! time fails with `ResourceBusy` (503) instead of queueing forever.

use crate::common::{coordinator, empty_request, json_request, send, StubBackend};
use axum::http::{Method, StatusCode};
use model_gateway::api::http_server::{create_app, AppState};
use model_gateway::{GatewayError, OperationContext, OptimizeRequest};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_embed_times_out_behind_writer() {
    let (coordinator, calls, _) =
        coordinator(StubBackend::default(), Some(Duration::from_millis(30)));

    let guard = coordinator.resource().write().await.unwrap();
    let err = assert_err!(coordinator.generate_embedding("blocked").await);
    drop(guard);

    assert!(matches!(err, GatewayError::ResourceBusy { access: "read", .. }));
    assert_eq!(err.status_code(), 503);
    assert_eq!(calls.embed(), 0);

    // Access is available again once the writer is gone
    assert_ok!(coordinator.generate_embedding("free").await);
}

#[tokio::test]
async fn test_optimize_times_out_behind_reader() {
    let (coordinator, calls, _) =
        coordinator(StubBackend::default(), Some(Duration::from_millis(30)));

    let reader = coordinator.resource().read().await.unwrap();
    let err = assert_err!(
        coordinator
            .optimize_model(&OperationContext::new(), OptimizeRequest::new("m"))
            .await
    );
    drop(reader);

    assert!(matches!(err, GatewayError::ResourceBusy { access: "write", .. }));
    assert_eq!(calls.load(), 0, "pipeline must not start without write access");
}

#[tokio::test]
async fn test_busy_resource_maps_to_service_unavailable() {
    let (coordinator, _, _) = coordinator(StubBackend::default(), Some(Duration::from_millis(20)));
    let state = AppState::new(coordinator.clone());

    let guard = coordinator.resource().write().await.unwrap();

    let (status, body) = send(
        create_app(state.clone()),
        json_request(Method::POST, "/embed", r#"{"text": "x"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "RESOURCE_BUSY");

    // Health stays up regardless
    let (status, _) = send(create_app(state), empty_request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);

    drop(guard);
}

#[tokio::test]
async fn test_unbounded_wait_eventually_succeeds() {
    let (coordinator, _, _) = coordinator(StubBackend::default(), None);

    let guard = coordinator.resource().write().await.unwrap();
    let waiter = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.generate_embedding("patient").await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished());

    drop(guard);
    let vector = waiter.await.unwrap().unwrap();
    assert_eq!(vector.len(), 384);
}
