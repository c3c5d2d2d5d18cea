// ABOUTME: Member provisioning from resolved identities and development-only data reset
// ABOUTME: Coach role comes from configuration and an upsert never demotes a coach
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use accountability_core::calendar::CalendarDay;
use accountability_core::models::{Member, MemberId, MemberProfile, MemberRole};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{aggregator, run_downstream};
use crate::auth::Identity;
use crate::blob_store::BlobStore;
use crate::config::environment::MemberConfig;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};

/// What a data reset removed
#[derive(Debug, Clone, Default)]
pub struct ResetSummary {
    /// Days that lost a check-in and had their aggregate recomputed
    pub affected_days: Vec<CalendarDay>,
    /// Number of photos removed
    pub photos_deleted: usize,
}

/// Profile to upsert for `identity`
#[must_use]
pub fn profile_for(identity: &Identity, config: &MemberConfig) -> MemberProfile {
    let role = if config.is_coach(identity.member_id.as_str()) {
        MemberRole::Coach
    } else {
        MemberRole::Member
    };
    MemberProfile {
        id: identity.member_id.clone(),
        display_name: identity.display_name.clone(),
        role,
    }
}

/// Create the caller's member record, or refresh it if it exists
///
/// # Errors
///
/// Returns an error if the upsert fails
pub async fn ensure_member<DB: DatabaseProvider>(
    database: &DB,
    identity: &Identity,
    config: &MemberConfig,
    now: DateTime<Utc>,
) -> AppResult<Member> {
    database
        .upsert_member(&profile_for(identity, config), now)
        .await
}

/// Delete everything a member has logged and zero their streak
///
/// # Errors
///
/// Returns `PermissionDenied` when data reset is disabled, or a storage error
pub async fn reset_member_data<DB: DatabaseProvider>(
    database: &DB,
    blobs: &dyn BlobStore,
    member_id: &MemberId,
    config: &MemberConfig,
    retry_attempts: u32,
    now: DateTime<Utc>,
) -> AppResult<ResetSummary> {
    if !config.allow_data_reset {
        return Err(AppError::permission_denied(
            "Data reset is only available in development",
        ));
    }

    let photos = database.list_photos(member_id).await?;
    let affected_days = database.reset_member_data(member_id).await?;

    for photo in &photos {
        if let Err(e) = blobs.delete(&photo.url).await {
            warn!(photo_id = %photo.id, error = %e, "Failed to delete photo blob during reset");
        }
    }

    for day in &affected_days {
        run_downstream("aggregate", retry_attempts, || {
            aggregator::recompute(database, *day, now)
        })
        .await;
    }

    info!(
        member_id = %member_id,
        days = affected_days.len(),
        photos = photos.len(),
        "Member data reset"
    );
    Ok(ResetSummary {
        affected_days,
        photos_deleted: photos.len(),
    })
}
