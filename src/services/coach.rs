// ABOUTME: Coach dashboard with per-member engagement and weekly community statistics
// ABOUTME: Also exposes the idempotent aggregate recomputation to coaches
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use accountability_core::calendar::{CalendarDay, Clock};
use accountability_core::constants::streaks::WEEKLY_WINDOW_DAYS;
use accountability_core::engagement::{is_photo_compliant, EngagementStatus};
use accountability_core::models::{DailyAggregate, KindCounts, Member, MemberId, MemberRole};
use chrono::Duration;
use serde::Serialize;
use tracing::info;

use super::aggregator;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};

/// One member row on the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct MemberSummary {
    /// Member id
    pub member_id: MemberId,
    /// Display name
    pub display_name: Option<String>,
    /// Current streak
    pub current_streak: u32,
    /// Longest streak
    pub longest_streak: u32,
    /// Day of the last check-in
    pub last_check_in_date: Option<CalendarDay>,
    /// Engagement classification as of today
    pub status: EngagementStatus,
    /// Photos uploaded ever
    pub photo_count: u32,
    /// Day of the last photo upload
    pub last_photo_date: Option<CalendarDay>,
    /// Whether the member met the weekly photo requirement
    pub photo_compliant: bool,
}

/// Community statistics over the trailing week
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Members with role MEMBER
    pub total_members: u32,
    /// Check-ins created in the trailing week
    pub weekly_checkins: u32,
    /// Reflections created in the trailing week
    pub weekly_reflections: u32,
    /// Weekly check-ins per possible check-in, as a percentage with one decimal
    pub engagement_rate: f64,
    /// Members meeting the weekly photo requirement
    pub photo_compliant_count: u32,
    /// Share of photo-compliant members, rounded percentage
    pub photo_compliance_rate: u32,
    /// Members who checked in today
    pub active_count: u32,
    /// Members last seen one or two days ago
    pub slipping_count: u32,
    /// Members last seen three or more days ago, or never
    pub ghosting_count: u32,
}

impl DashboardStats {
    /// Derive the statistics from member rows and weekly check-in counts
    #[must_use]
    pub fn compute(members: &[MemberSummary], weekly: KindCounts) -> Self {
        let total_members = members.len() as u32;
        let photo_compliant_count = members.iter().filter(|m| m.photo_compliant).count() as u32;
        let count_status =
            |status: EngagementStatus| members.iter().filter(|m| m.status == status).count() as u32;

        let weekly_checkins = weekly.total();
        let (engagement_rate, photo_compliance_rate) = if total_members == 0 {
            (0.0, 0)
        } else {
            let possible = f64::from(total_members) * WEEKLY_WINDOW_DAYS as f64;
            let rate = f64::from(weekly_checkins) / possible * 100.0;
            let compliance =
                (f64::from(photo_compliant_count) / f64::from(total_members) * 100.0).round();
            ((rate * 10.0).round() / 10.0, compliance as u32)
        };

        Self {
            total_members,
            weekly_checkins,
            weekly_reflections: weekly.reflection,
            engagement_rate,
            photo_compliant_count,
            photo_compliance_rate,
            active_count: count_status(EngagementStatus::Active),
            slipping_count: count_status(EngagementStatus::Slipping),
            ghosting_count: count_status(EngagementStatus::Ghosting),
        }
    }
}

/// The full coach dashboard
#[derive(Debug, Clone, Serialize)]
pub struct CoachDashboard {
    /// Member rows ordered by id
    pub members: Vec<MemberSummary>,
    /// Weekly statistics
    pub stats: DashboardStats,
}

fn require_coach(requester: &Member) -> AppResult<()> {
    if requester.is_coach() {
        Ok(())
    } else {
        Err(AppError::permission_denied("Coach access required"))
    }
}

/// Build the dashboard for a coach
///
/// # Errors
///
/// Returns `PermissionDenied` when `requester` is not a coach, or a storage error
pub async fn dashboard<DB: DatabaseProvider>(
    database: &DB,
    clock: &dyn Clock,
    requester: &Member,
) -> AppResult<CoachDashboard> {
    require_coach(requester)?;

    let now = clock.now();
    let today = CalendarDay::normalize(&now);
    let week_ago = now - Duration::days(WEEKLY_WINDOW_DAYS);

    let members = database.list_members(MemberRole::Member).await?;
    let mut summaries = Vec::with_capacity(members.len());
    for member in members {
        let photo_count = database.count_photos(&member.id, None).await?;
        let weekly_photos = database.count_photos(&member.id, Some(week_ago)).await?;
        summaries.push(MemberSummary {
            status: EngagementStatus::classify(member.last_check_in_date, today),
            photo_compliant: is_photo_compliant(weekly_photos),
            member_id: member.id,
            display_name: member.display_name,
            current_streak: member.current_streak,
            longest_streak: member.longest_streak,
            last_check_in_date: member.last_check_in_date,
            photo_count,
            last_photo_date: member.last_photo_date,
        });
    }

    let weekly = database.count_check_ins_since(week_ago).await?;
    let stats = DashboardStats::compute(&summaries, weekly);
    Ok(CoachDashboard {
        members: summaries,
        stats,
    })
}

/// Re-run the aggregate for `day` on behalf of a coach
///
/// # Errors
///
/// Returns `PermissionDenied` when `requester` is not a coach, or a storage error
pub async fn recompute_aggregate<DB: DatabaseProvider>(
    database: &DB,
    clock: &dyn Clock,
    requester: &Member,
    day: CalendarDay,
) -> AppResult<DailyAggregate> {
    require_coach(requester)?;
    let aggregate = aggregator::recompute(database, day, clock.now()).await?;
    info!(%day, coach = %requester.id, "Aggregate recomputed on request");
    Ok(aggregate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(status: EngagementStatus, photo_compliant: bool) -> MemberSummary {
        MemberSummary {
            member_id: MemberId::new("m").unwrap(),
            display_name: None,
            current_streak: 0,
            longest_streak: 0,
            last_check_in_date: None,
            status,
            photo_count: 0,
            last_photo_date: None,
            photo_compliant,
        }
    }

    #[test]
    fn test_stats_without_members_are_zero() {
        let stats = DashboardStats::compute(&[], KindCounts::default());
        assert_eq!(stats, DashboardStats::default());
    }

    #[test]
    fn test_engagement_rate_rounds_to_one_decimal() {
        let members = vec![
            summary(EngagementStatus::Active, true),
            summary(EngagementStatus::Slipping, false),
            summary(EngagementStatus::Ghosting, false),
        ];
        let weekly = KindCounts {
            workout: 5,
            rest: 2,
            reflection: 1,
        };
        let stats = DashboardStats::compute(&members, weekly);

        // 8 / 21 = 38.095...%
        assert!((stats.engagement_rate - 38.1).abs() < f64::EPSILON);
        assert_eq!(stats.weekly_checkins, 8);
        assert_eq!(stats.weekly_reflections, 1);
        assert_eq!(stats.photo_compliant_count, 1);
        assert_eq!(stats.photo_compliance_rate, 33);
        assert_eq!(
            (stats.active_count, stats.slipping_count, stats.ghosting_count),
            (1, 1, 1)
        );
    }
}
