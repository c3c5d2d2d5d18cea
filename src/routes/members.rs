// ABOUTME: Route handlers for member initialization and development data reset
// ABOUTME: Members are provisioned from the gateway identity on first contact
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use accountability_core::models::Member;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::services::members;

/// A member profile with streak fields
#[derive(Debug, Serialize, Deserialize)]
pub struct MemberResponse {
    /// Member id
    pub member_id: String,
    /// Display name
    pub display_name: Option<String>,
    /// MEMBER or COACH
    pub role: String,
    /// Current streak
    pub current_streak: u32,
    /// Longest streak
    pub longest_streak: u32,
    /// Day of the last check-in
    pub last_check_in_date: Option<String>,
    /// Day of the last photo upload
    pub last_photo_date: Option<String>,
    /// First contact
    pub created_at: String,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            member_id: member.id.to_string(),
            display_name: member.display_name,
            role: member.role.as_str().to_owned(),
            current_streak: member.current_streak,
            longest_streak: member.longest_streak,
            last_check_in_date: member.last_check_in_date.map(|d| d.to_string()),
            last_photo_date: member.last_photo_date.map(|d| d.to_string()),
            created_at: member.created_at.to_rfc3339(),
        }
    }
}

/// Response of DELETE /api/members/me/data
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    /// Days whose aggregate was recomputed
    pub affected_days: Vec<String>,
    /// Photos removed
    pub photos_deleted: usize,
}

/// Member routes
pub struct MemberRoutes;

impl MemberRoutes {
    /// Create all member routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/members/init", post(Self::handle_init))
            .route("/api/members/me/data", delete(Self::handle_reset))
            .with_state(resources)
    }

    /// Handle POST /api/members/init - Create or refresh the caller's member record
    async fn handle_init(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let member = resources.authenticate(&headers).await?;
        Ok((StatusCode::OK, Json(MemberResponse::from(member))).into_response())
    }

    /// Handle DELETE /api/members/me/data - Wipe the caller's check-ins and photos
    async fn handle_reset(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let member = resources.authenticate(&headers).await?;
        let summary = members::reset_member_data(
            resources.database.as_ref(),
            resources.blob_store.as_ref(),
            &member.id,
            &resources.config.members,
            resources.config.checkins.downstream_retry_attempts,
            resources.now(),
        )
        .await?;

        let response = ResetResponse {
            affected_days: summary
                .affected_days
                .iter()
                .map(ToString::to_string)
                .collect(),
            photos_deleted: summary.photos_deleted,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
