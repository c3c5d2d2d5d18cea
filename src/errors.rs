// ABOUTME: Error types re-exported from accountability-core for use across the server
// ABOUTME: Keeps `crate::errors` paths stable for routes, services, and storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! The error types live in `accountability-core` so pure domain code can return them;
//! this module re-exports them under the server crate.

pub use accountability_core::errors::{
    AppError, AppResult, ErrorCode, ErrorResponse, ErrorResponseDetails,
};
