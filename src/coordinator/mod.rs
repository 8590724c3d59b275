// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Operation coordinator
//!
//! Single choke point for model operations. Embeddings take shared (read)
//! access to the model resource and may run concurrently; optimizations take
//! exclusive (write) access for the whole load → optimize → save pipeline, so
//! no reader ever observes a half-updated model and two optimizations never
//! race on the slot.

pub mod errors;
pub mod pipeline;
pub mod resource;

pub use errors::GatewayError;
pub use pipeline::{PipelineExecutor, PipelineJob, PipelineStage, PipelineState};
pub use resource::{
    Access, ModelResource, ModelSlot, ResourceGuard, ResourceState, SlotSnapshot,
};

use crate::backend::{Metrics, ModelBackend, OperationContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, Instrument};

/// Suffix appended to `model_path` when no output path is supplied
pub const DEFAULT_OUTPUT_SUFFIX: &str = ".optimized";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub model_path: String,
    #[serde(default)]
    pub training_data: Option<String>,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl OptimizeRequest {
    pub fn new(model_path: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            training_data: None,
            output_path: None,
        }
    }

    pub fn with_training_data(mut self, training_data: impl Into<String>) -> Self {
        self.training_data = Some(training_data.into());
        self
    }

    pub fn with_output_path(mut self, output_path: impl Into<String>) -> Self {
        self.output_path = Some(output_path.into());
        self
    }

    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.model_path.trim().is_empty() {
            return Err(GatewayError::InvalidRequest {
                field: "model_path".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Output path used for the save stage.
    ///
    /// A supplied, non-blank `output_path` is used verbatim; otherwise the
    /// model path with [`DEFAULT_OUTPUT_SUFFIX`] appended.
    pub fn resolved_output_path(&self) -> String {
        match self.output_path.as_deref() {
            Some(path) if !path.trim().is_empty() => path.to_string(),
            _ => format!("{}{}", self.model_path, DEFAULT_OUTPUT_SUFFIX),
        }
    }

    fn training_data(&self) -> Option<&str> {
        self.training_data
            .as_deref()
            .filter(|path| !path.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeResult {
    pub output_path: String,
    pub metrics: Metrics,
    /// Slot revision after the optimized model was installed
    pub revision: u64,
}

/// Snapshot of the resource for health reporting; never waits on the lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub resource: ResourceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,
    /// When the active model was last installed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct ModelCoordinator<B: ModelBackend> {
    backend: Arc<B>,
    resource: ModelResource<B::Model>,
}

impl<B: ModelBackend> ModelCoordinator<B> {
    /// Creates a coordinator with an empty model slot.
    ///
    /// `lock_timeout` bounds how long any operation waits for the resource;
    /// `None` waits indefinitely.
    pub fn new(backend: B, lock_timeout: Option<Duration>) -> Self {
        Self::with_shared_backend(Arc::new(backend), lock_timeout)
    }

    pub fn with_shared_backend(backend: Arc<B>, lock_timeout: Option<Duration>) -> Self {
        Self {
            backend,
            resource: ModelResource::new(lock_timeout),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn resource(&self) -> &ModelResource<B::Model> {
        &self.resource
    }

    /// Generates an embedding for `text` under shared access.
    ///
    /// Empty text is accepted and still yields a full-width vector.
    pub async fn generate_embedding(&self, text: &str) -> Result<Vec<f64>, GatewayError> {
        let vector = {
            let guard = self.resource.acquire(Access::Read).await?;
            self.backend
                .embed(guard.slot().active.as_ref(), text)
                .await
                .map_err(GatewayError::Backend)?
        };

        let expected = self.backend.dimension();
        if vector.len() != expected {
            return Err(GatewayError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }

        debug!(chars = text.len(), dimension = expected, "embedding generated");
        Ok(vector)
    }

    /// Runs the optimize pipeline under exclusive access.
    ///
    /// On success the optimized model becomes the active model. On any stage
    /// failure the slot is left untouched and the stage error is returned.
    pub async fn optimize_model(
        &self,
        ctx: &OperationContext,
        req: OptimizeRequest,
    ) -> Result<OptimizeResult, GatewayError> {
        req.validate()?;

        let span = info_span!(
            "optimize",
            request_id = %ctx.request_id,
            model_path = %req.model_path
        );

        async move {
            let output_path = req.resolved_output_path();

            let mut guard = self.resource.acquire(Access::Write).await?;
            debug!("write access acquired");

            let mut executor = PipelineExecutor::new(self.backend.as_ref());
            let output = executor
                .run(
                    ctx,
                    PipelineJob {
                        model_path: &req.model_path,
                        training_data: req.training_data(),
                        output_path: &output_path,
                    },
                )
                .await?;

            let revision = guard.install(output.model, req.model_path.clone())?;
            drop(guard);

            let elapsed_ms = (Utc::now() - ctx.started_at).num_milliseconds();
            info!(
                revision,
                elapsed_ms,
                output_path = %output_path,
                "optimized model committed"
            );
            Ok::<_, GatewayError>(OptimizeResult {
                output_path,
                metrics: output.metrics,
                revision,
            })
        }
        .instrument(span)
        .await
    }

    /// Loads `model_path` into the slot without optimizing it.
    pub async fn preload(&self, model_path: &str) -> Result<u64, GatewayError> {
        let mut guard = self.resource.acquire(Access::Write).await?;

        let model = self
            .backend
            .load(model_path)
            .await
            .map_err(|source| GatewayError::Load {
                model_path: model_path.to_string(),
                source,
            })?;

        let revision = guard.install(model, model_path)?;
        info!(model_path, revision, backend = self.backend.name(), "model preloaded");
        Ok(revision)
    }

    pub fn status(&self) -> ModelStatus {
        let snapshot = self.resource.try_snapshot();
        ModelStatus {
            resource: match snapshot {
                Some(_) => ResourceState::Available,
                None => ResourceState::Busy,
            },
            revision: snapshot.map(|s| s.revision),
            updated_at: snapshot.and_then(|s| s.updated_at),
        }
    }
}
