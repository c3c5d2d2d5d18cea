// ABOUTME: Main library entry point for the fitness accountability server
// ABOUTME: Daily check-ins, streaks, a privacy-filtered feed, and a coach dashboard over REST
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Accountability Server
//!
//! Members record one check-in per calendar day. Each check-in drives a
//! per-member streak and a per-day community aggregate; public notes and
//! photos appear in a shared feed; coaches see an engagement dashboard.
//!
//! ## Architecture
//!
//! - **`accountability-core`**: pure domain types, streak and engagement rules
//! - **Database plugins**: `SQLite` and in-memory stores behind [`database_plugins::DatabaseProvider`]
//! - **Services**: the check-in pipeline, feed projection, aggregation, coach views
//! - **Routes**: thin axum handlers over the services
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use accountability_server::config::environment::ServerConfig;
//! use accountability_server::database_plugins::factory::Database;
//! use accountability_server::resources::ServerResources;
//! use accountability_server::routes;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(ServerConfig::from_env()?);
//!     let database = Database::from_url(&config.database).await?;
//!     let resources = Arc::new(ServerResources::new(database, config));
//!     let _app = routes::router(resources);
//!     Ok(())
//! }
//! ```

/// Caller identity resolution from gateway headers
pub mod auth;

/// Photo blob storage
pub mod blob_store;

/// Configuration management
pub mod config;

/// Storage backends and the `DatabaseProvider` trait
pub mod database_plugins;

/// Unified error handling
pub mod errors;

/// Structured logging setup
pub mod logging;

/// HTTP middleware
pub mod middleware;

/// Dependency container shared by route handlers
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Domain service layer
pub mod services;

pub use accountability_core::{calendar, constants, engagement, models, pagination, streak};
