// ABOUTME: Community aggregator recomputing one DailyAggregate row per calendar day
// ABOUTME: Recomputation reads the ledger and member count, so re-running it is harmless
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use accountability_core::calendar::CalendarDay;
use accountability_core::models::{DailyAggregate, MemberRole};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::database_plugins::DatabaseProvider;
use crate::errors::AppResult;

/// Recount `day` from the ledger and store the result
///
/// # Errors
///
/// Returns an error if counting or the upsert fails
pub async fn recompute<DB: DatabaseProvider>(
    database: &DB,
    day: CalendarDay,
    now: DateTime<Utc>,
) -> AppResult<DailyAggregate> {
    let counts = database.count_check_ins_by_kind(day).await?;
    let total_members = database.count_members(MemberRole::Member).await?;
    let aggregate = DailyAggregate::from_counts(day, total_members, counts, now);

    database.upsert_daily_aggregate(&aggregate).await?;
    debug!(
        %day,
        total_members,
        active_today = aggregate.active_today,
        "Recomputed daily aggregate"
    );
    Ok(aggregate)
}

/// The stored aggregate for `day`, or all zeros when none was computed yet
///
/// # Errors
///
/// Returns an error if the read fails
pub async fn get<DB: DatabaseProvider>(database: &DB, day: CalendarDay) -> AppResult<DailyAggregate> {
    Ok(database
        .get_daily_aggregate(day)
        .await?
        .unwrap_or_else(|| DailyAggregate::empty(day)))
}
