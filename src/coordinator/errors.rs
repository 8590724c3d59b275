// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for coordinated model operations
//!
//! Backend failures are never recovered here. Each pipeline stage wraps its
//! originating cause so callers can tell "load failed" from "optimize failed"
//! from "save failed" without parsing messages.

use super::pipeline::PipelineStage;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Request body could not be parsed
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Request parsed but violates a field constraint
    #[error("Invalid request: {field} {message}")]
    InvalidRequest { field: String, message: String },

    /// Embedding generation failed in the backend
    #[error("Embedding backend error: {0:#}")]
    Backend(anyhow::Error),

    /// Backend returned a vector of the wrong width
    #[error("Embedding backend error: expected {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("load stage failed for {model_path}: {source:#}")]
    Load {
        model_path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("optimize stage failed for {model_path}: {source:#}")]
    Optimize {
        model_path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("save stage failed for {output_path}: {source:#}")]
    Save {
        output_path: String,
        #[source]
        source: anyhow::Error,
    },

    /// Wrong HTTP verb on a mutating route
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Bounded wait for the shared model resource elapsed
    #[error(
        "Model resource busy: could not acquire {access} access within {}ms",
        waited.as_millis()
    )]
    ResourceBusy {
        access: &'static str,
        waited: Duration,
    },

    /// Mutation attempted through a read guard
    #[error("Model resource mutation requires write access")]
    WriteAccessRequired,

    /// Request body exceeded the configured size limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
}

impl GatewayError {
    /// Pipeline stage that produced this error, if any
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            GatewayError::Load { .. } => Some(PipelineStage::Load),
            GatewayError::Optimize { .. } => Some(PipelineStage::Optimize),
            GatewayError::Save { .. } => Some(PipelineStage::Save),
            _ => None,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::MalformedRequest(_) | GatewayError::InvalidRequest { .. } => 400,
            GatewayError::MethodNotAllowed(_) => 405,
            GatewayError::PayloadTooLarge(_) => 413,
            GatewayError::ResourceBusy { .. } => 503,
            GatewayError::WriteAccessRequired
            | GatewayError::Backend(_)
            | GatewayError::DimensionMismatch { .. }
            | GatewayError::Load { .. }
            | GatewayError::Optimize { .. }
            | GatewayError::Save { .. } => 500,
        }
    }

    /// Get error code for logging
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::MalformedRequest(_) => "MALFORMED_REQUEST",
            GatewayError::InvalidRequest { .. } => "INVALID_REQUEST",
            GatewayError::Backend(_) => "BACKEND_ERROR",
            GatewayError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            GatewayError::Load { .. } => "LOAD_ERROR",
            GatewayError::Optimize { .. } => "OPTIMIZE_ERROR",
            GatewayError::Save { .. } => "SAVE_ERROR",
            GatewayError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            GatewayError::ResourceBusy { .. } => "RESOURCE_BUSY",
            GatewayError::WriteAccessRequired => "WRITE_ACCESS_REQUIRED",
            GatewayError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
        }
    }
}
