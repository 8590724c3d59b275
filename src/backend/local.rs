// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Reference backend that runs entirely in-process
//!
//! Embeddings are deterministic pseudo-random vectors seeded from a SHA-256
//! digest of the active model and the input text, so the same text against the
//! same model always yields the same vector. Models are opaque byte payloads
//! read from and written to the local filesystem.

use super::{Metrics, ModelBackend, OperationContext, DEFAULT_EMBEDDING_DIMENSION};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct LocalBackendConfig {
    pub dimension: usize,
    pub normalize: bool,
}

impl Default for LocalBackendConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_EMBEDDING_DIMENSION,
            normalize: true,
        }
    }
}

/// A model loaded by [`LocalBackend`]
#[derive(Debug, Clone)]
pub struct LocalModel {
    /// Path the model was loaded from
    pub source_path: String,
    /// Raw model bytes
    pub payload: Vec<u8>,
    /// Hex SHA-256 of payload and optimization history
    pub digest: String,
    /// Number of optimization passes applied since load
    pub passes: u32,
    /// Training samples seen across all passes
    pub training_samples: usize,
}

impl LocalModel {
    fn refresh_digest(&mut self) {
        let mut hasher = Sha256::new();
        hasher.update(&self.payload);
        hasher.update(self.passes.to_le_bytes());
        hasher.update((self.training_samples as u64).to_le_bytes());
        self.digest = hex::encode(hasher.finalize());
    }
}

pub struct LocalBackend {
    config: LocalBackendConfig,
}

impl LocalBackend {
    pub fn new(config: LocalBackendConfig) -> Result<Self> {
        if config.dimension == 0 {
            return Err(anyhow!("Embedding dimension must be greater than 0"));
        }

        Ok(Self { config })
    }

    fn seed_for(model: Option<&LocalModel>, text: &str) -> u64 {
        let mut hasher = Sha256::new();
        if let Some(model) = model {
            hasher.update(model.digest.as_bytes());
        }
        hasher.update(text.as_bytes());
        let digest = hasher.finalize();

        let mut seed = [0u8; 8];
        seed.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(seed)
    }
}

#[async_trait]
impl ModelBackend for LocalBackend {
    type Model = LocalModel;

    fn name(&self) -> &str {
        "local"
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed(&self, model: Option<&LocalModel>, text: &str) -> Result<Vec<f64>> {
        let mut current_seed = Self::seed_for(model, text);
        let mut embedding = Vec::with_capacity(self.config.dimension);

        for i in 0..self.config.dimension {
            // Linear congruential step, mixed with the position
            current_seed =
                (current_seed.wrapping_mul(1664525).wrapping_add(1013904223)) ^ (i as u64);

            // Map into [-1, 1]
            let value = (current_seed as f64 / u64::MAX as f64) * 2.0 - 1.0;
            embedding.push(value);
        }

        if self.config.normalize {
            let norm = embedding.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm > 0.0 {
                for value in &mut embedding {
                    *value /= norm;
                }
            }
        }

        Ok(embedding)
    }

    async fn load(&self, model_path: &str) -> Result<LocalModel> {
        let payload = tokio::fs::read(model_path)
            .await
            .with_context(|| format!("Failed to read model file {}", model_path))?;

        if payload.is_empty() {
            bail!("Model file {} is empty", model_path);
        }

        let mut model = LocalModel {
            source_path: model_path.to_string(),
            payload,
            digest: String::new(),
            passes: 0,
            training_samples: 0,
        };
        model.refresh_digest();

        info!(
            "Loaded model {} ({} bytes, digest {})",
            model_path,
            model.payload.len(),
            &model.digest[..12]
        );
        Ok(model)
    }

    async fn optimize(
        &self,
        ctx: &OperationContext,
        model: &mut LocalModel,
        training_data: Option<&str>,
    ) -> Result<Metrics> {
        let started = Instant::now();

        let (samples, training_bytes) = match training_data {
            Some(path) => {
                let data = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read training data {}", path))?;
                let samples = data.lines().filter(|line| !line.trim().is_empty()).count();
                if samples == 0 {
                    bail!("Training data {} contains no samples", path);
                }
                (samples, data.len())
            }
            None => (0, 0),
        };

        model.passes += 1;
        model.training_samples += samples;
        model.refresh_digest();

        let loss = 1.0 / (1.0 + model.training_samples as f64);
        let elapsed = started.elapsed().as_secs_f64().max(1e-6);
        let processed = (model.payload.len() + training_bytes) as f64;

        let mut metrics = Metrics::new();
        metrics.insert("accuracy".to_string(), 1.0 - loss);
        metrics.insert("loss".to_string(), loss);
        metrics.insert("throughput".to_string(), processed / elapsed);

        debug!(
            request_id = %ctx.request_id,
            samples,
            pass = model.passes,
            "Optimization pass complete"
        );
        Ok(metrics)
    }

    async fn save(&self, model: &LocalModel, output_path: &str) -> Result<()> {
        if let Some(parent) = Path::new(output_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
        }

        tokio::fs::write(output_path, &model.payload)
            .await
            .with_context(|| format!("Failed to write model to {}", output_path))?;

        info!(
            "Saved model {} → {} (pass {})",
            model.source_path, output_path, model.passes
        );
        Ok(())
    }
}
