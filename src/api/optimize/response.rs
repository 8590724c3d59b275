// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::backend::Metrics;
use crate::coordinator::OptimizeResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SUCCESS_MESSAGE: &str = "Model optimized successfully";

/// Response body for POST /optimize
///
/// ```json
/// {
///   "success": true,
///   "output_path": "models/base.bin.optimized",
///   "message": "Model optimized successfully",
///   "metrics": { "accuracy": 0.95, "loss": 0.05, "throughput": 1000.0 },
///   "request_id": "5f0c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeResponse {
    pub success: bool,
    pub output_path: String,
    pub message: String,
    pub metrics: Metrics,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub request_id: Option<Uuid>,
}

impl OptimizeResponse {
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id);
        self
    }
}

impl From<OptimizeResult> for OptimizeResponse {
    fn from(result: OptimizeResult) -> Self {
        OptimizeResponse {
            success: true,
            output_path: result.output_path,
            message: SUCCESS_MESSAGE.to_string(),
            metrics: result.metrics,
            request_id: None,
        }
    }
}
