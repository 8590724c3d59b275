// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed endpoint
//!
//! Turns a single text into a fixed-width embedding vector via the
//! coordinator. Embeddings run under shared access and may proceed
//! concurrently with each other.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::embed_handler;
pub use request::EmbedRequest;
pub use response::EmbedResponse;
