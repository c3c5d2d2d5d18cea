// ABOUTME: Centralized resource container for dependency injection into route handlers
// ABOUTME: Holds the store, blob store, identity resolver, clock, and configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Resources
//!
//! Every capability the services need is injected here once at startup. Tests
//! build the same container with an in-memory store and a [`FixedClock`].
//!
//! [`FixedClock`]: accountability_core::calendar::FixedClock

use std::sync::Arc;

use accountability_core::calendar::{Clock, SystemClock};
use accountability_core::models::Member;
use chrono::{DateTime, Utc};
use http::HeaderMap;

use crate::auth::{HeaderIdentityResolver, Identity, IdentityResolver};
use crate::blob_store::{BlobStore, LocalBlobStore};
use crate::config::environment::ServerConfig;
use crate::database_plugins::factory::Database;
use crate::errors::AppResult;
use crate::services::members;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Durable store
    pub database: Arc<Database>,
    /// Photo blob store
    pub blob_store: Arc<dyn BlobStore>,
    /// Caller identity resolution
    pub identity: Arc<dyn IdentityResolver>,
    /// Source of "now"
    pub clock: Arc<dyn Clock>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Production resources: header identity, system clock, local blob store
    #[must_use]
    pub fn new(database: Database, config: Arc<ServerConfig>) -> Self {
        let blob_store = Arc::new(LocalBlobStore::from_config(&config.photos));
        Self {
            database: Arc::new(database),
            blob_store,
            identity: Arc::new(HeaderIdentityResolver),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the blob store
    #[must_use]
    pub fn with_blob_store(mut self, blob_store: Arc<dyn BlobStore>) -> Self {
        self.blob_store = blob_store;
        self
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the identity resolver
    #[must_use]
    pub fn with_identity(mut self, identity: Arc<dyn IdentityResolver>) -> Self {
        self.identity = identity;
        self
    }

    /// Current instant from the injected clock
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Resolve the caller of a request
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when no identity was asserted
    pub fn identify(&self, headers: &HeaderMap) -> AppResult<Identity> {
        self.identity.resolve(headers)
    }

    /// Resolve the caller and make sure they have a member record
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when no identity was asserted, or a storage error
    pub async fn authenticate(&self, headers: &HeaderMap) -> AppResult<Member> {
        let identity = self.identify(headers)?;
        self.provision(&identity).await
    }

    /// Create or refresh the member record for an already resolved identity
    ///
    /// # Errors
    ///
    /// Returns a storage error if the member cannot be upserted
    pub async fn provision(&self, identity: &Identity) -> AppResult<Member> {
        members::ensure_member(
            self.database.as_ref(),
            identity,
            &self.config.members,
            self.now(),
        )
        .await
    }
}
