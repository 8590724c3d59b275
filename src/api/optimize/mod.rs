// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /optimize endpoint
//!
//! Runs the load → optimize → save pipeline with exclusive access to the
//! shared model resource. The request body is [`OptimizeRequest`].

pub mod handler;
pub mod response;

pub use crate::coordinator::OptimizeRequest;
pub use handler::optimize_handler;
pub use response::OptimizeResponse;
