// ABOUTME: Route handlers for the coach dashboard and on-demand aggregate recomputation
// ABOUTME: Both endpoints require the caller to hold the COACH role
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::community::DayQuery;
use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::services::coach;

/// Coach routes
pub struct CoachRoutes;

impl CoachRoutes {
    /// Create all coach routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/coach/dashboard", get(Self::handle_dashboard))
            .route(
                "/api/coach/community-stats/recompute",
                post(Self::handle_recompute),
            )
            .with_state(resources)
    }

    /// Handle GET /api/coach/dashboard - Member engagement and weekly stats
    async fn handle_dashboard(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let requester = resources.authenticate(&headers).await?;
        let dashboard = coach::dashboard(
            resources.database.as_ref(),
            resources.clock.as_ref(),
            &requester,
        )
        .await?;

        Ok((
            StatusCode::OK,
            [(
                header::CACHE_CONTROL,
                HeaderValue::from_static("private, max-age=120"),
            )],
            Json(dashboard),
        )
            .into_response())
    }

    /// Handle POST /api/coach/community-stats/recompute - Re-run a day's aggregate
    async fn handle_recompute(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<DayQuery>,
    ) -> Result<Response, AppError> {
        let requester = resources.authenticate(&headers).await?;
        let day = query.resolve(&resources)?;

        let aggregate = coach::recompute_aggregate(
            resources.database.as_ref(),
            resources.clock.as_ref(),
            &requester,
            day,
        )
        .await?;

        Ok((StatusCode::OK, Json(aggregate)).into_response())
    }
}
