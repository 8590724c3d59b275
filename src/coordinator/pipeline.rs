// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Load → optimize → save pipeline
//!
//! Stages run strictly in order. The first failing stage halts the pipeline;
//! later stages are never invoked and nothing is committed. A retry always
//! starts again from load.

use super::errors::GatewayError;
use crate::backend::{Metrics, ModelBackend, OperationContext};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Load,
    Optimize,
    Save,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Load => "load",
            PipelineStage::Optimize => "optimize",
            PipelineStage::Save => "save",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Pending,
    Loaded,
    Optimized,
    Saved,
    Failed(PipelineStage),
}

/// Inputs for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineJob<'a> {
    pub model_path: &'a str,
    pub training_data: Option<&'a str>,
    pub output_path: &'a str,
}

/// A model that made it through all three stages
#[derive(Debug)]
pub struct PipelineOutput<M> {
    pub model: M,
    pub metrics: Metrics,
}

pub struct PipelineExecutor<'a, B: ModelBackend> {
    backend: &'a B,
    state: PipelineState,
}

impl<'a, B: ModelBackend> PipelineExecutor<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            state: PipelineState::Pending,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Runs all stages, stopping at the first failure.
    ///
    /// The executor's state reflects where the run ended: `Saved` on success,
    /// `Failed(stage)` otherwise.
    pub async fn run(
        &mut self,
        ctx: &OperationContext,
        job: PipelineJob<'_>,
    ) -> Result<PipelineOutput<B::Model>, GatewayError> {
        let backend = self.backend;

        let mut model = match backend.load(job.model_path).await {
            Ok(model) => model,
            Err(source) => {
                return Err(self.fail(
                    ctx,
                    GatewayError::Load {
                        model_path: job.model_path.to_string(),
                        source,
                    },
                ))
            }
        };
        self.advance(ctx, PipelineState::Loaded);

        let metrics = match backend.optimize(ctx, &mut model, job.training_data).await {
            Ok(metrics) => metrics,
            Err(source) => {
                return Err(self.fail(
                    ctx,
                    GatewayError::Optimize {
                        model_path: job.model_path.to_string(),
                        source,
                    },
                ))
            }
        };
        self.advance(ctx, PipelineState::Optimized);

        if let Err(source) = backend.save(&model, job.output_path).await {
            return Err(self.fail(
                ctx,
                GatewayError::Save {
                    output_path: job.output_path.to_string(),
                    source,
                },
            ));
        }
        self.advance(ctx, PipelineState::Saved);

        Ok(PipelineOutput { model, metrics })
    }

    fn advance(&mut self, ctx: &OperationContext, next: PipelineState) {
        info!(request_id = %ctx.request_id, from = ?self.state, to = ?next, "pipeline transition");
        self.state = next;
    }

    fn fail(&mut self, ctx: &OperationContext, error: GatewayError) -> GatewayError {
        // stage() is always Some for the errors constructed in run()
        if let Some(stage) = error.stage() {
            self.state = PipelineState::Failed(stage);
        }
        warn!(
            request_id = %ctx.request_id,
            code = error.error_code(),
            "pipeline halted: {}",
            error
        );
        error
    }
}
