// ABOUTME: Route handler for daily community statistics
// ABOUTME: Days without a stored aggregate read as all zeros
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use accountability_core::calendar::CalendarDay;
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use crate::services::aggregator;

/// Query carrying an optional `YYYY-MM-DD` day
#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    /// Calendar day, today when absent
    pub date: Option<String>,
}

impl DayQuery {
    /// The requested day, or today from `resources`' clock
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for malformed dates
    pub fn resolve(&self, resources: &ServerResources) -> AppResult<CalendarDay> {
        match self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => raw.parse(),
            None => Ok(CalendarDay::today(resources.clock.as_ref())),
        }
    }
}

/// Community statistics routes
pub struct CommunityRoutes;

impl CommunityRoutes {
    /// Create all community routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/community-stats", get(Self::handle_stats))
            .with_state(resources)
    }

    /// Handle GET /api/community-stats - Aggregate for one day
    async fn handle_stats(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<DayQuery>,
    ) -> Result<Response, AppError> {
        let day = query.resolve(&resources)?;
        let aggregate = aggregator::get(resources.database.as_ref(), day).await?;

        Ok((
            StatusCode::OK,
            [(
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=300"),
            )],
            Json(aggregate),
        )
            .into_response())
    }
}
