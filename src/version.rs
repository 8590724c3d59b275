// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the model gateway

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "model-gateway";

/// Semantic version number
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "embeddings",
    "model-optimization",
    "reader-writer-coordination",
    "bounded-lock-wait",
];

/// Get formatted version string
pub fn get_version_string() -> String {
    format!("{} v{}", SERVICE_NAME, VERSION)
}
