// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model backend capability
//!
//! The gateway never performs numeric work itself. Everything it needs from
//! the model library is expressed by [`ModelBackend`]: embed a text against the
//! currently active model, and the three optimization stages (load, optimize,
//! save). The coordinator owns the loaded model; the backend only ever sees it
//! through borrows handed out while a resource guard is held.

pub mod local;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use uuid::Uuid;

pub use local::{LocalBackend, LocalBackendConfig, LocalModel};

/// Default embedding width (all-MiniLM class models)
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;

/// Metric name → value, as reported by the optimize stage
pub type Metrics = BTreeMap<String, f64>;

/// Per-operation context passed into backend stages
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub request_id: Uuid,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl OperationContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            started_at: chrono::Utc::now(),
        }
    }

    pub fn with_request_id(request_id: Uuid) -> Self {
        Self {
            request_id,
            started_at: chrono::Utc::now(),
        }
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// External numeric backend used by the coordinator
///
/// Implementations are treated as black boxes: the gateway relies only on the
/// input/output contract of each method and never retries a failed call.
#[async_trait]
pub trait ModelBackend: Send + Sync + 'static {
    /// Loaded model context produced by [`ModelBackend::load`]
    type Model: Send + Sync + 'static;

    /// Human-readable backend name (used in logs and health output)
    fn name(&self) -> &str;

    /// Width of every vector returned by [`ModelBackend::embed`]
    fn dimension(&self) -> usize;

    /// Computes an embedding for `text`.
    ///
    /// `model` is the currently active model, if one has been loaded or
    /// optimized. Must not mutate shared state.
    async fn embed(&self, model: Option<&Self::Model>, text: &str) -> Result<Vec<f64>>;

    /// Loads the model stored at `model_path`.
    async fn load(&self, model_path: &str) -> Result<Self::Model>;

    /// Optimizes `model` in place, optionally using a training data location.
    async fn optimize(
        &self,
        ctx: &OperationContext,
        model: &mut Self::Model,
        training_data: Option<&str>,
    ) -> Result<Metrics>;

    /// Persists `model` to `output_path`.
    async fn save(&self, model: &Self::Model, output_path: &str) -> Result<()>;
}
