// ABOUTME: Route handler for the public community feed
// ABOUTME: Offset pagination with limit 1..=100; private notes and photos never leave the projector
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use accountability_core::models::FeedEntry;
use accountability_core::pagination::{OffsetPage, PaginationParams};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::services::feed;

/// Query of GET /api/feed
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// Page size, 1..=100
    pub limit: Option<i64>,
    /// Entries to skip
    pub offset: Option<i64>,
}

/// Feed routes
pub struct FeedRoutes;

impl FeedRoutes {
    /// Create all feed routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/feed", get(Self::handle_feed))
            .with_state(resources)
    }

    /// Handle GET /api/feed - Public check-ins, newest first
    async fn handle_feed(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<FeedQuery>,
    ) -> Result<Response, AppError> {
        resources.authenticate(&headers).await?;
        let params = PaginationParams::from_query(query.limit, query.offset)?;

        let page: OffsetPage<FeedEntry> =
            feed::public_feed(resources.database.as_ref(), params).await?;

        Ok((StatusCode::OK, Json(page)).into_response())
    }
}
