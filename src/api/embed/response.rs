// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};

/// Response body for POST /embed
///
/// ```json
/// { "success": true, "embedding": [0.01, -0.2, ...], "dimension": 384 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub success: bool,
    pub embedding: Vec<f64>,
    pub dimension: usize,
}

impl From<Vec<f64>> for EmbedResponse {
    fn from(embedding: Vec<f64>) -> Self {
        EmbedResponse {
            success: true,
            dimension: embedding.len(),
            embedding,
        }
    }
}
