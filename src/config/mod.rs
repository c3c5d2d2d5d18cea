// ABOUTME: Configuration management module for server settings
// ABOUTME: Environment-only configuration for ports, storage, check-in rules, and coaches
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! All settings come from environment variables, with CLI overrides applied by the
//! binary. See [`environment::ServerConfig::from_env`].

/// Environment and server configuration
pub mod environment;
