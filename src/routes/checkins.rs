// ABOUTME: Route handlers for the check-in ledger REST API
// ABOUTME: Create, read today, history with heat map, delete, and visibility toggles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Check-in routes
//!
//! All endpoints act on behalf of the caller resolved from gateway headers.

use std::str::FromStr;
use std::sync::Arc;

use accountability_core::calendar::CalendarDay;
use accountability_core::models::{
    CheckIn, CheckInDetails, CheckInKind, DailyAggregate, HeatmapPoint, MuscleGroup,
    VisibilityField,
};
use accountability_core::streak::StreakState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::environment::CheckInConfig;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use crate::services::checkins::{self, VisibilityState};

// ============================================================================
// Request Types
// ============================================================================

/// Body of POST /api/checkin
#[derive(Debug, Deserialize)]
pub struct CreateCheckInBody {
    /// WORKOUT, REST, or REFLECTION
    #[serde(alias = "type")]
    pub kind: Option<String>,
    /// Workout focus, required for WORKOUT
    pub muscle_group: Option<String>,
    /// Free text note
    pub note: Option<String>,
    /// Whether the note may appear in the public feed
    #[serde(default)]
    pub is_note_public: bool,
    /// Previously uploaded photo to attach
    pub photo_id: Option<Uuid>,
}

impl CreateCheckInBody {
    /// Parse and validate the kind and details in validation order
    fn into_parts(self) -> AppResult<(CheckInKind, CheckInDetails)> {
        let kind = CheckInKind::from_str(self.kind.as_deref().unwrap_or_default())?;
        let muscle_group = self
            .muscle_group
            .as_deref()
            .filter(|g| !g.trim().is_empty())
            .map(MuscleGroup::from_str)
            .transpose()?;
        let details = CheckInDetails {
            muscle_group,
            note: self.note,
            is_note_public: self.is_note_public,
            photo_id: self.photo_id,
        }
        .validate_for(kind)?;
        Ok((kind, details))
    }
}

/// Query of GET /api/checkin/history
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of check-ins, 1..=365
    pub limit: Option<i64>,
}

/// Body of POST /api/checkin/:id/visibility
#[derive(Debug, Deserialize)]
pub struct VisibilityBody {
    /// `note` or `photo`
    pub field: String,
}

// ============================================================================
// Response Types
// ============================================================================

/// A check-in as shown to its owner
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckInResponse {
    /// Check-in id
    pub id: String,
    /// Kind
    pub kind: String,
    /// Calendar day, `YYYY-MM-DD`
    pub calendar_day: String,
    /// Workout focus
    pub muscle_group: Option<String>,
    /// Note text
    pub note: Option<String>,
    /// Whether the note is public
    pub is_note_public: bool,
    /// Linked photo
    pub photo_id: Option<String>,
    /// Creation time
    pub created_at: String,
}

impl From<CheckIn> for CheckInResponse {
    fn from(check_in: CheckIn) -> Self {
        Self {
            id: check_in.id.to_string(),
            kind: check_in.kind.as_str().to_owned(),
            calendar_day: check_in.calendar_day.to_string(),
            muscle_group: check_in.muscle_group.map(|g| g.as_str().to_owned()),
            note: check_in.note,
            is_note_public: check_in.is_note_public,
            photo_id: check_in.photo_id.map(|id| id.to_string()),
            created_at: check_in.created_at.to_rfc3339(),
        }
    }
}

/// Streak fields after a check-in
#[derive(Debug, Serialize, Deserialize)]
pub struct StreakResponse {
    /// Current streak
    pub current_streak: u32,
    /// Longest streak
    pub longest_streak: u32,
    /// Day of the latest check-in
    pub last_check_in_date: Option<String>,
}

impl From<StreakState> for StreakResponse {
    fn from(state: StreakState) -> Self {
        Self {
            current_streak: state.current_streak,
            longest_streak: state.longest_streak,
            last_check_in_date: state.last_check_in_date.map(|d| d.to_string()),
        }
    }
}

/// Response of POST /api/checkin
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCheckInResponse {
    /// The stored check-in
    pub check_in: CheckInResponse,
    /// Streak after the check-in, absent if it could not be updated yet
    pub streak: Option<StreakResponse>,
    /// Community aggregate for the day, absent if it could not be recomputed yet
    pub community: Option<DailyAggregate>,
    /// Last instant the owner may delete the check-in
    pub deletable_until: String,
}

/// Response of GET /api/checkin
#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    /// Today's calendar day
    pub today: String,
    /// Today's check-in, if any
    pub check_in: Option<CheckInResponse>,
    /// Last instant the owner may delete it
    pub deletable_until: Option<String>,
}

/// Response of GET /api/checkin/history
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Check-ins, most recent day first
    pub check_ins: Vec<CheckInResponse>,
    /// Heat map points
    pub heatmap: Vec<HeatmapPoint>,
}

/// Response of POST /api/checkin/:id/visibility
#[derive(Debug, Serialize, Deserialize)]
pub struct VisibilityResponse {
    /// Check-in id
    pub check_in_id: String,
    /// Whether the note is public
    pub is_note_public: bool,
    /// Whether the linked photo is public
    pub is_photo_public: Option<bool>,
}

impl From<VisibilityState> for VisibilityResponse {
    fn from(state: VisibilityState) -> Self {
        Self {
            check_in_id: state.check_in_id.to_string(),
            is_note_public: state.is_note_public,
            is_photo_public: state.is_photo_public,
        }
    }
}

fn deletable_until(check_in: &CheckIn, config: &CheckInConfig) -> String {
    checkins::deletion_deadline(check_in, config).to_rfc3339()
}

/// Malformed or mistyped JSON bodies are validation errors
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::invalid_input(rejection.body_text()))
}

fn parse_check_in_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::invalid_input("Invalid check-in id"))
}

// ============================================================================
// Routes
// ============================================================================

/// Check-in routes
pub struct CheckInRoutes;

impl CheckInRoutes {
    /// Create all check-in routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/checkin",
                get(Self::handle_get_today).post(Self::handle_create),
            )
            .route("/api/checkin/history", get(Self::handle_history))
            .route("/api/checkin/:id", delete(Self::handle_delete))
            .route(
                "/api/checkin/:id/visibility",
                post(Self::handle_toggle_visibility),
            )
            .with_state(resources)
    }

    /// Handle GET /api/checkin - Today's check-in for the caller
    async fn handle_get_today(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let member = resources.authenticate(&headers).await?;
        let check_in =
            checkins::get_today(resources.database.as_ref(), resources.clock.as_ref(), &member.id)
                .await?;

        let config = &resources.config.checkins;
        let response = TodayResponse {
            today: CalendarDay::today(resources.clock.as_ref()).to_string(),
            deletable_until: check_in.as_ref().map(|c| deletable_until(c, config)),
            check_in: check_in.map(Into::into),
        };

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/checkin - Create today's check-in
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Result<Json<CreateCheckInBody>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let identity = resources.identify(&headers)?;
        let (kind, details) = json_body(body)?.into_parts()?;
        let member = resources.provision(&identity).await?;

        let config = &resources.config.checkins;
        let outcome = checkins::create_check_in(
            resources.database.as_ref(),
            resources.clock.as_ref(),
            config,
            &member,
            kind,
            details,
        )
        .await?;

        let response = CreateCheckInResponse {
            deletable_until: deletable_until(&outcome.check_in, config),
            check_in: outcome.check_in.into(),
            streak: outcome.streak.map(Into::into),
            community: outcome.aggregate,
        };

        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/checkin/history - Caller's history and heat map
    async fn handle_history(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<HistoryQuery>,
    ) -> Result<Response, AppError> {
        let member = resources.authenticate(&headers).await?;
        let limit = checkins::history_limit(query.limit)?;

        let history =
            checkins::list_history(resources.database.as_ref(), &member.id, limit).await?;
        let response = HistoryResponse {
            check_ins: history.check_ins.into_iter().map(Into::into).collect(),
            heatmap: history.heatmap,
        };

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/checkin/:id - Delete a check-in
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let member = resources.authenticate(&headers).await?;
        let check_in_id = parse_check_in_id(&id)?;

        checkins::delete_check_in(
            resources.database.as_ref(),
            resources.clock.as_ref(),
            &resources.config.checkins,
            check_in_id,
            &member,
        )
        .await?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/checkin/:id/visibility - Toggle note or photo visibility
    async fn handle_toggle_visibility(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        body: Result<Json<VisibilityBody>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let identity = resources.identify(&headers)?;
        let check_in_id = parse_check_in_id(&id)?;
        let field = VisibilityField::from_str(&json_body(body)?.field)?;
        let member = resources.provision(&identity).await?;

        let state =
            checkins::toggle_visibility(resources.database.as_ref(), check_in_id, field, &member.id)
                .await?;

        Ok((StatusCode::OK, Json(VisibilityResponse::from(state))).into_response())
    }
}
