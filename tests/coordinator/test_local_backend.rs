// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end tests with the built-in local backend
//!
//! Real files on disk: load a model, optimize it against training data,
//! write it out, and check that embeddings change once the optimized model
//! is active.

use model_gateway::{
    GatewayError, LocalBackend, LocalBackendConfig, ModelCoordinator, OperationContext,
    OptimizeRequest, PipelineStage,
};
use std::path::Path;
use tempfile::TempDir;

fn setup() -> (TempDir, ModelCoordinator<LocalBackend>) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("base.bin"), b"base-weights").unwrap();
    std::fs::write(dir.path().join("train.txt"), "first\nsecond\nthird\n").unwrap();

    let backend = LocalBackend::new(LocalBackendConfig::default()).unwrap();
    (dir, ModelCoordinator::new(backend, None))
}

fn path(dir: &Path, name: &str) -> String {
    dir.join(name).to_str().unwrap().to_string()
}

#[tokio::test]
async fn test_optimize_writes_output_and_changes_embeddings() {
    let (dir, coordinator) = setup();
    let model_path = path(dir.path(), "base.bin");
    let output_path = path(dir.path(), "nested/base.opt");

    coordinator.preload(&model_path).await.unwrap();
    let before = coordinator.generate_embedding("query").await.unwrap();
    assert_eq!(before.len(), 384);

    let result = coordinator
        .optimize_model(
            &OperationContext::new(),
            OptimizeRequest::new(&model_path)
                .with_training_data(path(dir.path(), "train.txt"))
                .with_output_path(&output_path),
        )
        .await
        .unwrap();

    assert_eq!(result.output_path, output_path);
    assert_eq!(result.revision, 2);
    assert!((result.metrics["loss"] - 0.25).abs() < 1e-9);
    assert!(result.metrics["throughput"] > 0.0);
    assert_eq!(std::fs::read(&output_path).unwrap(), b"base-weights");

    let after = coordinator.generate_embedding("query").await.unwrap();
    assert_eq!(after.len(), 384);
    assert_ne!(before, after);
}

#[tokio::test]
async fn test_default_output_path_written() {
    let (dir, coordinator) = setup();
    let model_path = path(dir.path(), "base.bin");

    let result = coordinator
        .optimize_model(&OperationContext::new(), OptimizeRequest::new(&model_path))
        .await
        .unwrap();

    assert_eq!(result.output_path, format!("{}.optimized", model_path));
    assert!(Path::new(&result.output_path).exists());
}

#[tokio::test]
async fn test_missing_model_fails_at_load() {
    let (dir, coordinator) = setup();
    let output_path = path(dir.path(), "never.bin");

    let err = coordinator
        .optimize_model(
            &OperationContext::new(),
            OptimizeRequest::new(path(dir.path(), "missing.bin")).with_output_path(&output_path),
        )
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::Load));
    assert!(!Path::new(&output_path).exists(), "save must not run");
}

#[tokio::test]
async fn test_missing_training_data_fails_at_optimize() {
    let (dir, coordinator) = setup();
    let output_path = path(dir.path(), "never.bin");

    let err = coordinator
        .optimize_model(
            &OperationContext::new(),
            OptimizeRequest::new(path(dir.path(), "base.bin"))
                .with_training_data(path(dir.path(), "nope.txt"))
                .with_output_path(&output_path),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Optimize { .. }));
    assert!(!Path::new(&output_path).exists());
    assert_eq!(coordinator.status().revision, Some(0));
}
