// ABOUTME: Check-in ledger operations with streak and aggregate downstream steps
// ABOUTME: Validation and permission checks run before any write; uniqueness comes from storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use accountability_core::calendar::{CalendarDay, Clock};
use accountability_core::constants::checkins::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use accountability_core::models::{
    CheckIn, CheckInDetails, CheckInKind, DailyAggregate, HeatmapPoint, Member, MemberId,
    VisibilityField,
};
use accountability_core::streak::StreakState;
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::{aggregator, run_downstream};
use crate::config::environment::CheckInConfig;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};

/// Result of a successful check-in
#[derive(Debug, Clone)]
pub struct CheckInOutcome {
    /// The stored check-in
    pub check_in: CheckIn,
    /// Streak after the check-in; `None` if the streak step failed every attempt
    pub streak: Option<StreakState>,
    /// Aggregate after the check-in; `None` if the aggregate step failed every attempt
    pub aggregate: Option<DailyAggregate>,
}

/// A member's history with heat map points
#[derive(Debug, Clone)]
pub struct CheckInHistory {
    /// Check-ins, most recent day first
    pub check_ins: Vec<CheckIn>,
    /// One heat map point per check-in
    pub heatmap: Vec<HeatmapPoint>,
}

/// Visibility flags after a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityState {
    /// Check-in the toggle applied to
    pub check_in_id: Uuid,
    /// Whether the note is public
    pub is_note_public: bool,
    /// Whether the linked photo is public, when there is one
    pub is_photo_public: Option<bool>,
}

/// The member's check-in for today, if any
///
/// # Errors
///
/// Returns an error if the read fails
pub async fn get_today<DB: DatabaseProvider>(
    database: &DB,
    clock: &dyn Clock,
    member_id: &MemberId,
) -> AppResult<Option<CheckIn>> {
    database
        .get_check_in_for_day(member_id, CalendarDay::today(clock))
        .await
}

/// Record today's check-in for `member`
///
/// The ledger write is the unit of success. The streak and aggregate steps run
/// after it and are retried and logged on failure, never rolled back into it.
///
/// # Errors
///
/// Returns `ValidationError` for bad details, `DuplicateCheckIn` when the member
/// already checked in today, or a storage error from the ledger write
pub async fn create_check_in<DB: DatabaseProvider>(
    database: &DB,
    clock: &dyn Clock,
    config: &CheckInConfig,
    member: &Member,
    kind: CheckInKind,
    details: CheckInDetails,
) -> AppResult<CheckInOutcome> {
    let details = details.validate_for(kind)?;
    if let Some(photo_id) = details.photo_id {
        let owned = database
            .get_photo(photo_id)
            .await?
            .is_some_and(|p| p.member_id == member.id);
        if !owned {
            return Err(AppError::invalid_input(format!(
                "Photo {photo_id} does not exist or belongs to another member"
            )));
        }
    }

    let now = clock.now();
    let check_in = CheckIn::new(member.id.clone(), kind, details, now);
    database.insert_check_in(&check_in).await?;
    info!(
        member_id = %member.id,
        kind = %kind,
        day = %check_in.calendar_day,
        "Check-in recorded"
    );

    let day = check_in.calendar_day;
    let attempts = config.downstream_retry_attempts;
    let streak = run_downstream("streak", attempts, || {
        advance_streak(database, &member.id, kind, day)
    })
    .await;
    let aggregate = run_downstream("aggregate", attempts, || {
        aggregator::recompute(database, day, now)
    })
    .await;

    Ok(CheckInOutcome {
        check_in,
        streak,
        aggregate,
    })
}

/// Apply one check-in to the stored streak of `member_id`
async fn advance_streak<DB: DatabaseProvider>(
    database: &DB,
    member_id: &MemberId,
    kind: CheckInKind,
    day: CalendarDay,
) -> AppResult<StreakState> {
    let member = database
        .get_member(member_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Member {member_id}")))?;

    // Re-applying on the same day leaves the state unchanged, so retries are safe
    let next = member.streak().apply(kind, day);
    database.update_member_streak(member_id, &next).await?;
    Ok(next)
}

/// Delete a check-in
///
/// Coaches may delete any check-in at any time. Everyone else may delete only
/// their own, and only within the configured window. Past streaks are left as
/// they are; the day's aggregate is recomputed.
///
/// # Errors
///
/// Returns `ResourceNotFound`, `PermissionDenied`, `DeletionWindowExpired`, or a
/// storage error
pub async fn delete_check_in<DB: DatabaseProvider>(
    database: &DB,
    clock: &dyn Clock,
    config: &CheckInConfig,
    check_in_id: Uuid,
    requester: &Member,
) -> AppResult<()> {
    let check_in = database
        .get_check_in(check_in_id)
        .await?
        .ok_or_else(|| AppError::not_found("Check-in"))?;

    let now = clock.now();
    if !requester.is_coach() {
        if check_in.member_id != requester.id {
            return Err(AppError::permission_denied(
                "Only the owner can delete this check-in",
            ));
        }
        if !check_in.within_deletion_window(now, config.deletion_window()) {
            return Err(AppError::deletion_window_expired(
                config.deletion_window_minutes,
            ));
        }
    }

    if !database.delete_check_in(check_in_id).await? {
        return Err(AppError::not_found("Check-in"));
    }
    info!(
        check_in_id = %check_in_id,
        requested_by = %requester.id,
        coach_override = requester.is_coach() && check_in.member_id != requester.id,
        "Check-in deleted"
    );

    let day = check_in.calendar_day;
    run_downstream("aggregate", config.downstream_retry_attempts, || {
        aggregator::recompute(database, day, now)
    })
    .await;
    Ok(())
}

/// Flip the visibility of a check-in's note or linked photo
///
/// # Errors
///
/// Returns `ResourceNotFound`, `PermissionDenied` for non-owners, or
/// `ValidationError` when toggling the photo of a check-in without one
pub async fn toggle_visibility<DB: DatabaseProvider>(
    database: &DB,
    check_in_id: Uuid,
    field: VisibilityField,
    requester: &MemberId,
) -> AppResult<VisibilityState> {
    let check_in = database
        .get_check_in(check_in_id)
        .await?
        .ok_or_else(|| AppError::not_found("Check-in"))?;
    if &check_in.member_id != requester {
        return Err(AppError::permission_denied(
            "Only the owner can change visibility",
        ));
    }

    let photo = match check_in.photo_id {
        Some(photo_id) => database.get_photo(photo_id).await?,
        None => None,
    };

    let mut state = VisibilityState {
        check_in_id,
        is_note_public: check_in.is_note_public,
        is_photo_public: photo.as_ref().map(|p| p.is_public),
    };

    match field {
        VisibilityField::Note => {
            state.is_note_public = !check_in.is_note_public;
            database
                .set_note_visibility(check_in_id, state.is_note_public)
                .await?;
        }
        VisibilityField::Photo => {
            let photo = photo.ok_or_else(|| {
                AppError::invalid_input("Check-in has no photo to change visibility for")
            })?;
            state.is_photo_public = Some(!photo.is_public);
            database
                .set_photo_visibility(photo.id, !photo.is_public)
                .await?;
        }
        _ => {
            warn!(?field, "Unsupported visibility field");
            return Err(AppError::invalid_input("Unsupported visibility field"));
        }
    }

    Ok(state)
}

/// Parse the history `limit` query value
///
/// # Errors
///
/// Returns `ValidationError` when `limit` is outside `1..=365`
pub fn history_limit(limit: Option<i64>) -> AppResult<u32> {
    let limit = limit.unwrap_or_else(|| i64::from(DEFAULT_HISTORY_LIMIT));
    if !(1..=i64::from(MAX_HISTORY_LIMIT)).contains(&limit) {
        return Err(AppError::invalid_input(format!(
            "limit must be between 1 and {MAX_HISTORY_LIMIT}"
        )));
    }
    u32::try_from(limit).map_err(|_| AppError::invalid_input("limit out of range"))
}

/// A member's most recent check-ins and their heat map
///
/// # Errors
///
/// Returns an error if the read fails
pub async fn list_history<DB: DatabaseProvider>(
    database: &DB,
    member_id: &MemberId,
    limit: u32,
) -> AppResult<CheckInHistory> {
    let check_ins = database.list_check_ins(member_id, limit).await?;
    let heatmap = check_ins.iter().map(HeatmapPoint::from).collect();
    Ok(CheckInHistory { check_ins, heatmap })
}

/// Instant the deletion window of `check_in` closes
#[must_use]
pub fn deletion_deadline(check_in: &CheckIn, config: &CheckInConfig) -> DateTime<Utc> {
    check_in.created_at + config.deletion_window()
}
