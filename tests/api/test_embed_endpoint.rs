// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed tests
//!
//! Covers the happy path, empty text, malformed bodies (which must never
//! reach the coordinator) and backend failures.

use crate::common::{app_state, json_request, send, StubBackend, STUB_DIMENSION};
use axum::http::{Method, StatusCode};
use model_gateway::api::http_server::create_app;

#[tokio::test]
async fn test_embed_returns_full_width_vector() {
    let (state, calls) = app_state(StubBackend::default());
    let app = create_app(state);

    let (status, body) = send(
        app,
        json_request(Method::POST, "/embed", r#"{"text": "Hello world"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["dimension"], STUB_DIMENSION);
    let embedding = body["embedding"].as_array().unwrap();
    assert_eq!(embedding.len(), STUB_DIMENSION);
    assert_eq!(embedding[0], 11.0, "stub encodes text length at index 0");
    assert_eq!(calls.embed(), 1);
}

#[tokio::test]
async fn test_empty_text_still_embeds() {
    let (state, calls) = app_state(StubBackend::default());
    let app = create_app(state);

    let (status, body) = send(app, json_request(Method::POST, "/embed", r#"{"text": ""}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["embedding"].as_array().unwrap().len(), STUB_DIMENSION);
    assert_eq!(calls.embed(), 1);
}

#[tokio::test]
async fn test_malformed_json_rejected_before_coordinator() {
    let (state, calls) = app_state(StubBackend::default());

    for bad in [r#"{"text": "#, "not json", r#"{"text": 42}"#, r#"{}"#] {
        let (status, body) =
            send(create_app(state.clone()), json_request(Method::POST, "/embed", bad)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", bad);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "MALFORMED_REQUEST");
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    assert_eq!(calls.embed(), 0, "coordinator must not be invoked");
}

#[tokio::test]
async fn test_missing_content_type_is_bad_request() {
    let (state, calls) = app_state(StubBackend::default());
    let app = create_app(state);

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/embed")
        .body(axum::body::Body::from(r#"{"text": "hi"}"#))
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(calls.embed(), 0);
}

#[tokio::test]
async fn test_oversized_body_is_payload_too_large() {
    let (state, calls) = app_state(StubBackend::default());
    let app = create_app(state);

    // axum's default body limit is 2 MiB
    let body = format!(r#"{{"text": "{}"}}"#, "a".repeat(3 * 1024 * 1024));
    let (status, body) = send(app, json_request(Method::POST, "/embed", &body)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(calls.embed(), 0);
}

#[tokio::test]
async fn test_backend_failure_is_server_error() {
    let backend = StubBackend {
        fail_embed: true,
        ..Default::default()
    };
    let (state, _) = app_state(backend);
    let app = create_app(state);

    let (status, body) = send(app, json_request(Method::POST, "/embed", r#"{"text": "x"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BACKEND_ERROR");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("stub embedder unavailable"));
}

#[tokio::test]
async fn test_wrong_width_vector_is_server_error() {
    let backend = StubBackend {
        returned_dimension: 128,
        ..Default::default()
    };
    let (state, _) = app_state(backend);
    let app = create_app(state);

    let (status, body) = send(app, json_request(Method::POST, "/embed", r#"{"text": "x"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "DIMENSION_MISMATCH");
}
